//! The filter pipeline wrapped around every dispatch.
//!
//! ```text
//! pre-filters (in order)          a failure skips the handler
//! handler                         the terminal step
//! error filters (in order)        only on failure; may swallow it
//! post-filters (in order)         only after a successful handler
//! ```
//!
//! A swallowed failure completes the dispatch with the default value of the
//! result type. Post-filters do not run in that case.

use courier_core::{
    BoxErrorFilter, BoxPostHandleFilter, BoxPreHandleFilter, CancellationToken, CapabilityKey,
    Error, ErrorDisposition, FilterStage, HandlerRegistry, Message, MessageKind, Role,
};
use std::{any::Any, future::Future};

/// Resolve every instance for `key` and downcast each to `T`.
pub(crate) fn resolve_all<T: Any>(
    registry: &dyn HandlerRegistry,
    key: CapabilityKey,
) -> Result<Vec<T>, Error> {
    registry
        .resolve_all(&key)
        .into_iter()
        .map(|resolved| {
            resolved
                .downcast::<T>()
                .map_err(|_| Error::UnexpectedResolution(key))
        })
        .collect()
}

struct Filters {
    pre: Vec<BoxPreHandleFilter>,
    post: Vec<BoxPostHandleFilter>,
    error: Vec<BoxErrorFilter>,
}

impl Filters {
    fn resolve(registry: &dyn HandlerRegistry) -> Result<Self, Error> {
        Ok(Self {
            pre: resolve_all(registry, CapabilityKey::filter(Role::PreFilter))?,
            post: resolve_all(registry, CapabilityKey::filter(Role::PostFilter))?,
            error: resolve_all(registry, CapabilityKey::filter(Role::ErrorFilter))?,
        })
    }
}

/// One dispatch: a message, its cancellation token and the resolved filters.
pub(crate) struct Pipeline<'a> {
    kind: MessageKind,
    message: &'a dyn Message,
    cancel: &'a CancellationToken,
    filters: Filters,
}

impl<'a> Pipeline<'a> {
    /// Resolve the filters for a dispatch of `message`.
    pub(crate) fn new(
        registry: &dyn HandlerRegistry,
        kind: MessageKind,
        message: &'a dyn Message,
        cancel: &'a CancellationToken,
    ) -> Result<Self, Error> {
        Ok(Self {
            kind,
            message,
            cancel,
            filters: Filters::resolve(registry)?,
        })
    }

    /// Run the filters around `terminal`.
    ///
    /// `terminal` is not polled when a pre-filter fails.
    pub(crate) async fn run<R, F>(self, terminal: F) -> Result<R, Error>
    where
        R: Default + Send + Sync + 'static,
        F: Future<Output = Result<R, Error>> + Send,
    {
        if let Err(err) = self.pre_handle().await {
            return self.recover(err).await;
        }

        let result = match terminal.await {
            Ok(result) => result,
            Err(err) => return self.recover(err).await,
        };

        self.post_handle(&result).await?;
        Ok(result)
    }

    async fn pre_handle(&self) -> Result<(), Error> {
        for filter in &self.filters.pre {
            filter
                .pre_handle(self.kind, self.message, self.cancel)
                .await
                .map_err(|e| Error::from_filter(FilterStage::Pre, e))?;
        }
        Ok(())
    }

    async fn post_handle(&self, result: &(dyn Any + Send + Sync)) -> Result<(), Error> {
        for filter in &self.filters.post {
            filter
                .post_handle(self.kind, self.message, result, self.cancel)
                .await
                .map_err(|e| Error::from_filter(FilterStage::Post, e))?;
        }
        Ok(())
    }

    /// Show `err` to every error filter; swallow it if any of them handled it.
    async fn recover<R: Default>(&self, err: Error) -> Result<R, Error> {
        let mut handled = false;
        for filter in &self.filters.error {
            match filter
                .on_error(self.kind, self.message, &err, self.cancel)
                .await
            {
                Ok(ErrorDisposition::Handled) => handled = true,
                Ok(ErrorDisposition::Propagate) => {}
                Err(e) => return Err(Error::from_filter(FilterStage::Error, e)),
            }
        }

        if handled { Ok(R::default()) } else { Err(err) }
    }
}
