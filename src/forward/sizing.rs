//! Before-forward shape: the render target size query.

use crate::forward::CallObserver;

/// Forwards a render target size query and lets the observer adjust its result.
///
/// The original implementation always runs first and always receives the caller's output
/// locations unchanged. The observer only runs if both outputs are present.
///
/// # Arguments
///
/// * `observer` - The side-effect collaborator
/// * `width` - The caller's width output, `None` for a null pointer
/// * `height` - The caller's height output, `None` for a null pointer
/// * `call_original` - Invokes the original implementation with the given outputs
///
/// # Examples
///
/// ```rust
/// use vrshim::forward::{forward_size_query, NoopObserver};
///
/// let mut width = 0;
/// forward_size_query(&NoopObserver, Some(&mut width), None, |w, _h| {
///     if let Some(w) = w {
///         *w = 2016;
///     }
/// });
/// assert_eq!(width, 2016);
/// ```
pub fn forward_size_query<F>(
    observer: &dyn CallObserver,
    mut width: Option<&mut u32>,
    mut height: Option<&mut u32>,
    call_original: F,
) where
    F: FnOnce(Option<&mut u32>, Option<&mut u32>),
{
    call_original(width.as_deref_mut(), height.as_deref_mut());

    if let (Some(width), Some(height)) = (width, height) {
        observer.on_size_query_result(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::RecordingObserver;

    #[test]
    fn test_observer_adjusts_original_result() {
        let observer = RecordingObserver::scaling(2);
        let (mut width, mut height) = (0, 0);

        forward_size_query(&observer, Some(&mut width), Some(&mut height), |w, h| {
            *w.unwrap() = 1000;
            *h.unwrap() = 1100;
        });

        assert_eq!((width, height), (2000, 2200));
        assert_eq!(observer.size_queries(), vec![(1000, 1100)]);
    }

    #[test]
    fn test_null_output_skips_observer() {
        let observer = RecordingObserver::scaling(2);
        let mut width = 0;
        let mut original_called = false;

        forward_size_query(&observer, Some(&mut width), None, |w, h| {
            original_called = true;
            assert!(h.is_none());
            *w.unwrap() = 1000;
        });

        assert!(original_called);
        assert_eq!(width, 1000);
        assert!(observer.size_queries().is_empty());
    }

    #[test]
    fn test_both_null_still_forwards() {
        let observer = RecordingObserver::scaling(2);
        let mut original_called = false;

        forward_size_query(&observer, None, None, |_, _| original_called = true);

        assert!(original_called);
        assert!(observer.size_queries().is_empty());
    }
}
