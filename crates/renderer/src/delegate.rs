//! Save hooks

use crate::error::Result;

/// Observer called right before a renderer writes its document
///
/// The delegate gets mutable access to the context and may still change the
/// content. An error aborts the save.
pub trait RenderDelegate<C> {
    fn will_save_document(&mut self, context: &mut C) -> Result<()>;
}

impl<C, F> RenderDelegate<C> for F
where
    F: FnMut(&mut C) -> Result<()>,
{
    fn will_save_document(&mut self, context: &mut C) -> Result<()> {
        (*self)(context)
    }
}
