use std::sync::Arc;

use gadi_core::GadiApp;

pub struct GadiAxumState<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    pub app: Arc<GadiApp<R, P>>,
}

impl<R, P> Clone for GadiAxumState<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            app: Arc::clone(&self.app),
        }
    }
}

impl<R, P> GadiAxumState<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    pub fn new(app: GadiApp<R, P>) -> Self {
        Self { app: Arc::new(app) }
    }
}
