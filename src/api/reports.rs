use std::sync::Arc;

use poem::Request;
use poem_openapi::{
    param::Path,
    payload::{Binary, Json},
    OpenApi, Tags,
};
use uuid::Uuid;

use crate::api::request_context;
use crate::app_data::AppData;
use crate::errors::ReportApiError;
use crate::types::dto::report::{ExportResponse, PreviewResponse, VersionDetail, VersionSummary};

pub struct ReportsApi {
    app_data: Arc<AppData>,
}

impl ReportsApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self { app_data }
    }
}

#[derive(Tags)]
enum ApiTags {
    /// Certificate export and version management
    Reports,
}

#[OpenApi(prefix_path = "/reports")]
impl ReportsApi {
    /// Export a new FINAL certificate version for a sample
    #[oai(path = "/:sample_id/export", method = "post", tag = "ApiTags::Reports")]
    async fn export(
        &self,
        req: &Request,
        sample_id: Path<Uuid>,
    ) -> Result<Json<ExportResponse>, ReportApiError> {
        let ctx = request_context(req, self.app_data.capture.as_ref()).await;
        let outcome = self
            .app_data
            .report_manager
            .export_version(sample_id.0, &ctx)
            .await?;
        Ok(Json(outcome.into()))
    }

    /// Render a preview of the next certificate without committing anything
    #[oai(path = "/:sample_id/preview", method = "post", tag = "ApiTags::Reports")]
    async fn preview(
        &self,
        req: &Request,
        sample_id: Path<Uuid>,
    ) -> Result<Json<PreviewResponse>, ReportApiError> {
        let ctx = request_context(req, self.app_data.capture.as_ref()).await;
        let preview = self
            .app_data
            .report_manager
            .preview_snapshot(sample_id.0, &ctx)
            .await?;
        Ok(Json(PreviewResponse {
            version: preview.version,
            markup: preview.markup,
        }))
    }

    /// Create a DRAFT version for later finalization
    #[oai(path = "/:sample_id/draft", method = "post", tag = "ApiTags::Reports")]
    async fn create_draft(
        &self,
        req: &Request,
        sample_id: Path<Uuid>,
    ) -> Result<Json<VersionSummary>, ReportApiError> {
        let ctx = request_context(req, self.app_data.capture.as_ref()).await;
        let draft = self
            .app_data
            .report_manager
            .create_draft(sample_id.0, &ctx)
            .await?;
        Ok(Json(draft.into()))
    }

    /// Finalize a DRAFT version
    #[oai(path = "/versions/:id/finalize", method = "post", tag = "ApiTags::Reports")]
    async fn finalize(
        &self,
        req: &Request,
        id: Path<Uuid>,
    ) -> Result<Json<VersionSummary>, ReportApiError> {
        let ctx = request_context(req, self.app_data.capture.as_ref()).await;
        let finalized = self
            .app_data
            .report_manager
            .finalize_draft(id.0, &ctx)
            .await?;
        Ok(Json(finalized.into()))
    }

    /// List all versions for a sample, newest first
    #[oai(path = "/:sample_id/versions", method = "get", tag = "ApiTags::Reports")]
    async fn list_versions(
        &self,
        sample_id: Path<Uuid>,
    ) -> Result<Json<Vec<VersionSummary>>, ReportApiError> {
        let versions = self
            .app_data
            .report_manager
            .list_versions(sample_id.0)
            .await?;
        Ok(Json(versions.into_iter().map(Into::into).collect()))
    }

    /// Fetch one version with its frozen snapshot
    #[oai(path = "/versions/:id", method = "get", tag = "ApiTags::Reports")]
    async fn get_version(&self, id: Path<Uuid>) -> Result<Json<VersionDetail>, ReportApiError> {
        let version = self.app_data.report_manager.get_version(id.0).await?;
        Ok(Json(version.into()))
    }

    /// Download the stored certificate document
    ///
    /// Byte-identical on every call for the same version.
    #[oai(path = "/versions/:id/document", method = "get", tag = "ApiTags::Reports")]
    async fn download(&self, id: Path<Uuid>) -> Result<Binary<Vec<u8>>, ReportApiError> {
        let (_, bytes) = self.app_data.report_manager.download_document(id.0).await?;
        Ok(Binary(bytes))
    }
}
