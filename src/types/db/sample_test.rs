use sea_orm::entity::prelude::*;
use serde_json::json;

use crate::diff::FieldMap;
use crate::types::internal::spec_rule::Comparator;

/// SeaORM entity for the sample_tests table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sample_tests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sample_id: Uuid,
    pub method: String,
    pub result_value: Option<f64>,
    pub unit: Option<String>,
    pub comparator: String,
    pub limit_low: Option<f64>,
    pub limit_high: Option<f64>,
    pub out_of_spec: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sample::Entity",
        from = "Column::SampleId",
        to = "super::sample::Column::Id"
    )]
    Sample,
}

impl Related<super::sample::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sample.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Parse the stored comparator string into the closed enum.
    pub fn comparator(&self) -> Option<Comparator> {
        Comparator::parse(&self.comparator)
    }

    /// Project the row into a field map for audit diffing.
    pub fn field_map(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert("id".to_string(), json!(self.id));
        fields.insert("sample_id".to_string(), json!(self.sample_id));
        fields.insert("method".to_string(), json!(self.method));
        fields.insert("result_value".to_string(), json!(self.result_value));
        fields.insert("unit".to_string(), json!(self.unit));
        fields.insert("comparator".to_string(), json!(self.comparator));
        fields.insert("limit_low".to_string(), json!(self.limit_low));
        fields.insert("limit_high".to_string(), json!(self.limit_high));
        fields.insert("out_of_spec".to_string(), json!(self.out_of_spec));
        fields.insert("created_at".to_string(), json!(self.created_at));
        fields.insert("updated_at".to_string(), json!(self.updated_at));
        fields
    }
}
