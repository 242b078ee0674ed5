use crate::utils::error::Result;
use std::path::Path;

/// Read access to the source document plus page-subset export.
pub trait SourceDocument {
    fn page_count(&self) -> usize;

    /// Text of the page at 0-based `index`.
    fn page_text(&self, index: usize) -> Result<String>;

    /// 依原始順序將指定頁面寫成新文件
    fn write_pages(&self, indices: &[usize], dest: &Path) -> Result<()>;
}
