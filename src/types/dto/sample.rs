use poem_openapi::Object;
use uuid::Uuid;

use crate::types::db::{sample, sample_test};
use crate::types::internal::sample::{NewSample, NewSampleTest, SampleUpdate};

/// Request to register a sample, optionally with its test pack
#[derive(Object, Debug)]
pub struct CreateSampleRequest {
    pub job_code: String,
    pub name: String,
    pub matrix: String,
    pub temperature: Option<f64>,
    pub condition: Option<String>,
    /// RFC-3339 timestamp
    pub received_at: Option<String>,
    #[oai(default)]
    pub tests: Vec<CreateSampleTestRequest>,
}

#[derive(Object, Debug)]
pub struct CreateSampleTestRequest {
    pub method: String,
    pub result_value: Option<f64>,
    pub unit: Option<String>,
    /// One of GTE, LTE, EQUALS, RANGE
    pub comparator: String,
    pub limit_low: Option<f64>,
    pub limit_high: Option<f64>,
}

/// Partial sample update; absent fields stay untouched
#[derive(Object, Debug)]
pub struct UpdateSampleRequest {
    pub name: Option<String>,
    pub matrix: Option<String>,
    pub temperature: Option<f64>,
    pub condition: Option<String>,
    pub received_at: Option<String>,
    /// Recorded on the audit entry
    pub reason: Option<String>,
}

impl CreateSampleRequest {
    pub fn into_parts(self) -> (NewSample, Vec<NewSampleTest>) {
        let tests = self
            .tests
            .into_iter()
            .map(|t| NewSampleTest {
                method: t.method,
                result_value: t.result_value,
                unit: t.unit,
                comparator: t.comparator,
                limit_low: t.limit_low,
                limit_high: t.limit_high,
            })
            .collect();

        let sample = NewSample {
            job_code: self.job_code,
            name: self.name,
            matrix: self.matrix,
            temperature: self.temperature,
            condition: self.condition,
            received_at: self.received_at,
        };

        (sample, tests)
    }
}

impl UpdateSampleRequest {
    pub fn into_update(self) -> (SampleUpdate, Option<String>) {
        let update = SampleUpdate {
            name: self.name,
            matrix: self.matrix,
            temperature: self.temperature.map(Some),
            condition: self.condition.map(Some),
            received_at: self.received_at.map(Some),
        };
        (update, self.reason)
    }
}

/// Sample with its tests
#[derive(Object, Debug)]
pub struct SampleResponse {
    pub id: Uuid,
    pub job_code: String,
    pub name: String,
    pub matrix: String,
    pub temperature: Option<f64>,
    pub condition: Option<String>,
    pub received_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub tests: Vec<SampleTestDto>,
}

#[derive(Object, Debug)]
pub struct SampleTestDto {
    pub id: Uuid,
    pub method: String,
    pub result_value: Option<f64>,
    pub unit: Option<String>,
    pub comparator: String,
    pub limit_low: Option<f64>,
    pub limit_high: Option<f64>,
    pub out_of_spec: bool,
}

impl SampleResponse {
    pub fn from_models(sample: sample::Model, tests: Vec<sample_test::Model>) -> Self {
        Self {
            id: sample.id,
            job_code: sample.job_code,
            name: sample.name,
            matrix: sample.matrix,
            temperature: sample.temperature,
            condition: sample.condition,
            received_at: sample.received_at,
            created_at: sample.created_at,
            updated_at: sample.updated_at,
            tests: tests.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<sample_test::Model> for SampleTestDto {
    fn from(t: sample_test::Model) -> Self {
        Self {
            id: t.id,
            method: t.method,
            result_value: t.result_value,
            unit: t.unit,
            comparator: t.comparator,
            limit_low: t.limit_low,
            limit_high: t.limit_high,
            out_of_spec: t.out_of_spec,
        }
    }
}
