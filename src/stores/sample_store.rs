use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::errors::internal::{DatabaseError, ReportError};
use crate::errors::InternalError;
use crate::stores::AuditTrailStore;
use crate::types::db::{sample, sample_test};
use crate::types::internal::clock::now_rfc3339;
use crate::types::internal::sample::{NewSample, NewSampleTest, SampleTestUpdate, SampleUpdate};
use crate::types::internal::spec_rule::Comparator;
use crate::types::internal::{AuditContext, SubjectKind};

/// Repository for samples and their tests.
///
/// Every mutation runs in a transaction that commits only after its audit
/// entry is appended; a failed append rolls the row write back.
pub struct SampleStore {
    db: DatabaseConnection,
    audit: Arc<AuditTrailStore>,
}

impl SampleStore {
    pub fn new(db: DatabaseConnection, audit: Arc<AuditTrailStore>) -> Self {
        Self { db, audit }
    }

    /// Load a sample together with its tests, ordered by method name.
    pub async fn load_with_tests(
        &self,
        id: Uuid,
    ) -> Result<(sample::Model, Vec<sample_test::Model>), InternalError> {
        let sample = sample::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("load_sample", e))?
            .ok_or(ReportError::SubjectNotFound(id))?;

        let tests = sample_test::Entity::find()
            .filter(sample_test::Column::SampleId.eq(id))
            .order_by_asc(sample_test::Column::Method)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("load_sample_tests", e))?;

        Ok((sample, tests))
    }

    /// Register a new sample.
    pub async fn create_sample(
        &self,
        ctx: &AuditContext,
        input: NewSample,
    ) -> Result<sample::Model, InternalError> {
        let now = now_rfc3339();
        let model = sample::ActiveModel {
            id: Set(Uuid::new_v4()),
            job_code: Set(input.job_code),
            name: Set(input.name),
            matrix: Set(input.matrix),
            temperature: Set(input.temperature),
            condition: Set(input.condition),
            received_at: Set(input.received_at),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionBegin { source: e })?;

        let inserted = model
            .insert(&txn)
            .await
            .map_err(|e| InternalError::database("create_sample", e))?;

        self.audit
            .log_create(
                ctx,
                SubjectKind::Sample,
                &inserted.id.to_string(),
                &inserted.field_map(),
                None,
            )
            .await?;

        txn.commit()
            .await
            .map_err(|e| DatabaseError::TransactionCommit { source: e })?;

        Ok(inserted)
    }

    /// Register a sample together with its test pack.
    ///
    /// All audit entries share one transaction tag so the whole registration
    /// reads as a single operation in the grouped audit view.
    pub async fn create_sample_with_tests(
        &self,
        ctx: &AuditContext,
        input: NewSample,
        tests: Vec<NewSampleTest>,
    ) -> Result<(sample::Model, Vec<sample_test::Model>), InternalError> {
        let tag = AuditTrailStore::generate_transaction_tag();
        let tagged = ctx.clone().with_transaction_tag(tag);

        let sample = self.create_sample(&tagged, input).await?;

        let mut created = Vec::with_capacity(tests.len());
        for test in tests {
            created.push(self.create_test(&tagged, sample.id, test).await?);
        }

        Ok((sample, created))
    }

    /// Attach a test to a sample. The OOS flag is computed from the
    /// comparator at write time.
    pub async fn create_test(
        &self,
        ctx: &AuditContext,
        sample_id: Uuid,
        input: NewSampleTest,
    ) -> Result<sample_test::Model, InternalError> {
        let comparator = Comparator::parse(&input.comparator)
            .ok_or_else(|| InternalError::parse("comparator", input.comparator.clone()))?;
        let out_of_spec =
            comparator.out_of_spec(input.result_value, input.limit_low, input.limit_high);

        let now = now_rfc3339();
        let model = sample_test::ActiveModel {
            id: Set(Uuid::new_v4()),
            sample_id: Set(sample_id),
            method: Set(input.method),
            result_value: Set(input.result_value),
            unit: Set(input.unit),
            comparator: Set(comparator.as_str().to_string()),
            limit_low: Set(input.limit_low),
            limit_high: Set(input.limit_high),
            out_of_spec: Set(out_of_spec),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionBegin { source: e })?;

        let inserted = model
            .insert(&txn)
            .await
            .map_err(|e| InternalError::database("create_sample_test", e))?;

        self.audit
            .log_create(
                ctx,
                SubjectKind::SampleTest,
                &inserted.id.to_string(),
                &inserted.field_map(),
                None,
            )
            .await?;

        txn.commit()
            .await
            .map_err(|e| DatabaseError::TransactionCommit { source: e })?;

        Ok(inserted)
    }

    /// Apply a partial update to a sample. A no-op patch updates nothing
    /// audible: the trail store suppresses the empty diff.
    pub async fn update_sample(
        &self,
        ctx: &AuditContext,
        id: Uuid,
        patch: SampleUpdate,
        reason: Option<String>,
    ) -> Result<sample::Model, InternalError> {
        let old = sample::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("load_sample_for_update", e))?
            .ok_or(ReportError::SubjectNotFound(id))?;
        let old_fields = old.field_map();

        let mut active: sample::ActiveModel = old.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(matrix) = patch.matrix {
            active.matrix = Set(matrix);
        }
        if let Some(temperature) = patch.temperature {
            active.temperature = Set(temperature);
        }
        if let Some(condition) = patch.condition {
            active.condition = Set(condition);
        }
        if let Some(received_at) = patch.received_at {
            active.received_at = Set(received_at);
        }
        active.updated_at = Set(now_rfc3339());

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionBegin { source: e })?;

        let updated = active
            .update(&txn)
            .await
            .map_err(|e| InternalError::database("update_sample", e))?;

        self.audit
            .log_update(
                ctx,
                SubjectKind::Sample,
                &updated.id.to_string(),
                &old_fields,
                &updated.field_map(),
                reason,
            )
            .await?;

        txn.commit()
            .await
            .map_err(|e| DatabaseError::TransactionCommit { source: e })?;

        Ok(updated)
    }

    /// Apply a partial update to a test result, recomputing the OOS flag.
    pub async fn update_test(
        &self,
        ctx: &AuditContext,
        id: Uuid,
        patch: SampleTestUpdate,
        reason: Option<String>,
    ) -> Result<sample_test::Model, InternalError> {
        let old = sample_test::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("load_sample_test_for_update", e))?
            .ok_or(ReportError::SubjectNotFound(id))?;
        let old_fields = old.field_map();

        let result_value = patch.result_value.unwrap_or(old.result_value);
        let limit_low = patch.limit_low.unwrap_or(old.limit_low);
        let limit_high = patch.limit_high.unwrap_or(old.limit_high);
        let comparator_str = patch.comparator.unwrap_or_else(|| old.comparator.clone());
        let comparator = Comparator::parse(&comparator_str)
            .ok_or_else(|| InternalError::parse("comparator", comparator_str.clone()))?;

        let mut active: sample_test::ActiveModel = old.into();
        active.result_value = Set(result_value);
        active.limit_low = Set(limit_low);
        active.limit_high = Set(limit_high);
        active.comparator = Set(comparator.as_str().to_string());
        if let Some(unit) = patch.unit {
            active.unit = Set(unit);
        }
        active.out_of_spec = Set(comparator.out_of_spec(result_value, limit_low, limit_high));
        active.updated_at = Set(now_rfc3339());

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionBegin { source: e })?;

        let updated = active
            .update(&txn)
            .await
            .map_err(|e| InternalError::database("update_sample_test", e))?;

        self.audit
            .log_update(
                ctx,
                SubjectKind::SampleTest,
                &updated.id.to_string(),
                &old_fields,
                &updated.field_map(),
                reason,
            )
            .await?;

        txn.commit()
            .await
            .map_err(|e| DatabaseError::TransactionCommit { source: e })?;

        Ok(updated)
    }

    /// Remove a test from a sample. The deletion is recorded with the full
    /// pre-delete field map.
    pub async fn delete_test(
        &self,
        ctx: &AuditContext,
        id: Uuid,
        reason: Option<String>,
    ) -> Result<(), InternalError> {
        let old = sample_test::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("load_sample_test_for_delete", e))?
            .ok_or(ReportError::SubjectNotFound(id))?;
        let old_fields = old.field_map();
        let test_id = old.id;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionBegin { source: e })?;

        sample_test::Entity::delete_by_id(test_id)
            .exec(&txn)
            .await
            .map_err(|e| InternalError::database("delete_sample_test", e))?;

        self.audit
            .log_delete(ctx, SubjectKind::SampleTest, &test_id.to_string(), &old_fields, reason)
            .await?;

        txn.commit()
            .await
            .map_err(|e| DatabaseError::TransactionCommit { source: e })?;

        Ok(())
    }
}
