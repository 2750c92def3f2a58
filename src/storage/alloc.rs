use crate::error::{Result, RpropErr};

/// Fallibly allocates a buffer of `len` copies of `value`.
///
/// # Arguments
/// * `what` - Name of the buffer, used in the diagnostic.
/// * `len` - The amount of values to allocate.
/// * `value` - The value every slot starts with.
///
/// # Returns
/// The filled buffer or an `Alloc` error if the allocator refused the request.
pub(crate) fn filled(what: &'static str, len: usize, value: f64) -> Result<Box<[f64]>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|source| RpropErr::Alloc { what, len, source })?;

    buf.resize(len, value);
    Ok(buf.into_boxed_slice())
}
