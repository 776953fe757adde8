use std::path::Path;

/// Receiver for "this path was modified" notifications from the tool layer.
///
/// Implementations refresh whatever they derived from the file. Paths are
/// absolute; paths outside the listener's workspace are ignored.
pub trait PathChangeListener {
    fn path_changed(&mut self, abs_path: &Path);
}

impl<F> PathChangeListener for F
where
    F: FnMut(&Path),
{
    fn path_changed(&mut self, abs_path: &Path) {
        self(abs_path)
    }
}
