// SubmitSink trait — the contract for the external submit collaborator.

use std::future::Future;
use std::pin::Pin;

use futures_core::Stream;

use crate::document::Document;
use crate::error::Error;

/// A boxed future that is Send.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A boxed stream that is Send.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Where the finished document goes on submit. The controller treats the
/// implementation as opaque: resolution closes the wizard, rejection leaves
/// the document and step position untouched so the operator can retry.
///
/// Uses an explicit BoxFuture return type instead of the `async-trait`
/// macro so the object-safe contract stays visible at the signature.
pub trait SubmitSink: Send + Sync {
    fn submit(&self, document: Document) -> BoxFuture<'_, Result<(), Error>>;
}
