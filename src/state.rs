use crate::session::SessionHandle;

#[derive(Clone)]
pub struct AppState {
    pub session: SessionHandle,
}
