/// The candidate file set staged for one upload session.
///
/// Generic over the file handle type so the set can be exercised without a
/// browser; the frontend instantiates it with `gloo_file::File`.
#[derive(Debug, Clone, Default)]
pub struct Selection<F> {
    files: Vec<F>,
}

impl<F> Selection<F> {
    pub fn new() -> Self {
        Selection { files: Vec::new() }
    }

    /// Replaces the candidate set with the files from the latest picker or
    /// drop event. A second selection discards the first; an empty list is
    /// accepted and still replaces.
    pub fn set_selection<I>(&mut self, source: I)
    where
        I: IntoIterator<Item = F>,
    {
        self.files = source.into_iter().collect();
    }

    pub fn files(&self) -> &[F] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn status_line(&self) -> String {
        format!("{} file(s) selected", self.files.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_instead_of_appending() {
        let mut sel = Selection::new();
        sel.set_selection(["a.txt", "b.txt"]);
        sel.set_selection(["c.png"]);
        sel.set_selection(["d.zip", "e.mp4", "f.md"]);
        assert_eq!(sel.files(), &["d.zip", "e.mp4", "f.md"]);
        assert_eq!(sel.status_line(), "3 file(s) selected");
    }

    #[test]
    fn empty_selection_replaces_and_counts_zero() {
        let mut sel = Selection::new();
        sel.set_selection(["a.txt"]);
        sel.set_selection(std::iter::empty::<&str>());
        assert!(sel.is_empty());
        assert_eq!(sel.status_line(), "0 file(s) selected");
    }
}
