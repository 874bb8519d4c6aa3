use serde::Deserialize;

/// Input for registering a sample
#[derive(Debug, Clone, Deserialize)]
pub struct NewSample {
    pub job_code: String,
    pub name: String,
    pub matrix: String,
    pub temperature: Option<f64>,
    pub condition: Option<String>,
    pub received_at: Option<String>,
}

/// Partial update of a sample; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SampleUpdate {
    pub name: Option<String>,
    pub matrix: Option<String>,
    pub temperature: Option<Option<f64>>,
    pub condition: Option<Option<String>>,
    pub received_at: Option<Option<String>>,
}

/// Input for attaching a test to a sample
#[derive(Debug, Clone, Deserialize)]
pub struct NewSampleTest {
    pub method: String,
    pub result_value: Option<f64>,
    pub unit: Option<String>,
    pub comparator: String,
    pub limit_low: Option<f64>,
    pub limit_high: Option<f64>,
}

/// Partial update of a test result
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SampleTestUpdate {
    pub result_value: Option<Option<f64>>,
    pub unit: Option<Option<String>>,
    pub comparator: Option<String>,
    pub limit_low: Option<Option<f64>>,
    pub limit_high: Option<Option<f64>>,
}
