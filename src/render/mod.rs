// Render layer - certificate rendering and document storage seams
pub mod converter;
pub mod object_store;
pub mod renderer;

pub use converter::{DocumentConverter, HtmlDocumentConverter};
pub use object_store::{FsObjectStore, ObjectStore};
pub use renderer::{CertificateRenderer, ReportRenderer};
