#[cfg(feature = "tracing")]
macro_rules! ptrace {
    ($($tt:tt)*) => {
        tracing::trace!(target: "scrollpager", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! ptrace {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! pdebug {
    ($($tt:tt)*) => {
        tracing::debug!(target: "scrollpager", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! pdebug {
    ($($tt:tt)*) => {};
}
