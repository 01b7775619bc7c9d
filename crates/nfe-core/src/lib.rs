//! Record-driven assembly of NF-e documents.
//!
//! Records flow through the [`tokenize`](nfe_ingest::tokenize)r, the
//! [`binder`] and the [`Assembler`] state machine. The [`finalizer`] flushes
//! groups that have no closing record, and the [`Converter`] hands every
//! completed entity to a [`DocumentBuilder`] once the document succeeded.

pub mod assembler;
pub mod binder;
pub mod builder;
pub mod convert;
pub mod error;
pub mod finalizer;
pub mod handlers;
pub mod sanitize;

pub use assembler::Assembler;
pub use binder::bind;
pub use builder::{DocumentBuilder, RecordingBuilder};
pub use convert::{ConversionOptions, ConversionReport, Converter, load_registry};
pub use error::{BuilderError, ConvertError, Result};
pub use handlers::{Counter, Handler, HandlerTable, Slot, default_table};
pub use sanitize::sanitize;
