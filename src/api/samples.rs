use std::sync::Arc;

use poem::Request;
use poem_openapi::{param::Path, payload::Json, OpenApi, Tags};
use uuid::Uuid;

use crate::api::request_context;
use crate::app_data::AppData;
use crate::errors::ReportApiError;
use crate::types::dto::sample::{CreateSampleRequest, SampleResponse, UpdateSampleRequest};

pub struct SamplesApi {
    app_data: Arc<AppData>,
}

impl SamplesApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self { app_data }
    }
}

#[derive(Tags)]
enum ApiTags {
    /// Sample registration and updates
    Samples,
}

#[OpenApi(prefix_path = "/samples")]
impl SamplesApi {
    /// Register a sample, optionally with its test pack
    ///
    /// When tests are included, all audit entries of the registration share
    /// one transaction tag.
    #[oai(path = "/", method = "post", tag = "ApiTags::Samples")]
    async fn create(
        &self,
        req: &Request,
        body: Json<CreateSampleRequest>,
    ) -> Result<Json<SampleResponse>, ReportApiError> {
        let ctx = request_context(req, self.app_data.capture.as_ref()).await;
        let (new_sample, new_tests) = body.0.into_parts();
        let (sample, tests) = self
            .app_data
            .samples
            .create_sample_with_tests(&ctx, new_sample, new_tests)
            .await?;
        Ok(Json(SampleResponse::from_models(sample, tests)))
    }

    /// Fetch a sample with its tests
    #[oai(path = "/:id", method = "get", tag = "ApiTags::Samples")]
    async fn get(&self, id: Path<Uuid>) -> Result<Json<SampleResponse>, ReportApiError> {
        let (sample, tests) = self.app_data.samples.load_with_tests(id.0).await?;
        Ok(Json(SampleResponse::from_models(sample, tests)))
    }

    /// Apply a partial update to a sample
    ///
    /// A patch that changes nothing writes no audit entry.
    #[oai(path = "/:id", method = "patch", tag = "ApiTags::Samples")]
    async fn update(
        &self,
        req: &Request,
        id: Path<Uuid>,
        body: Json<UpdateSampleRequest>,
    ) -> Result<Json<SampleResponse>, ReportApiError> {
        let ctx = request_context(req, self.app_data.capture.as_ref()).await;
        let (update, reason) = body.0.into_update();
        let sample = self
            .app_data
            .samples
            .update_sample(&ctx, id.0, update, reason)
            .await?;
        let (sample, tests) = self.app_data.samples.load_with_tests(sample.id).await?;
        Ok(Json(SampleResponse::from_models(sample, tests)))
    }
}
