pub use log::debug;

/// Log a debug message, or print it straight to stderr when a local debug flag is set
///
/// Without the local flag the message only appears when the run uses `--debug`. Local flags are
/// plain `let debug = false;` bindings toggled while working on a single method.
///
/// # Examples
///
/// ```ignore
/// let debug = false;
/// debug_msg!(debug, "Merging clusters {a:?} and {b:?}");
/// ```
macro_rules! debug_msg {
    ($flag:expr, $($arg:tt)+) => {
        if $flag {
            eprintln!($($arg)+);
        } else {
            $crate::log_utils::debug!($($arg)+);
        }
    }
}

pub(crate) use debug_msg;
