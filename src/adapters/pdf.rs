use crate::domain::ports::SourceDocument;
use crate::utils::error::{Result, SplitError};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];
const MAX_TREE_DEPTH: usize = 64;

/// `SourceDocument` backed by a PDF loaded with lopdf.
pub struct PdfSource {
    path: PathBuf,
    document: Document,
    /// lopdf page number (1-based) and page object id, in document order
    pages: Vec<(u32, ObjectId)>,
}

impl PdfSource {
    pub fn open(path: &Path) -> Result<Self> {
        let document =
            Document::load(path).map_err(|e| SplitError::source_read(path.display().to_string(), e))?;
        Self::from_document(path, document)
    }

    pub fn from_document(path: &Path, document: Document) -> Result<Self> {
        if document.is_encrypted() {
            return Err(SplitError::source_read(
                path.display().to_string(),
                "encrypted PDFs are not supported",
            ));
        }

        let pages: Vec<(u32, ObjectId)> = document.get_pages().into_iter().collect();
        tracing::debug!("Loaded {} ({} pages)", path.display(), pages.len());

        Ok(Self {
            path: path.to_path_buf(),
            document,
            pages,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn page_number(&self, index: usize) -> Option<u32> {
        self.pages.get(index).map(|&(number, _)| number)
    }

    fn page_id(&self, index: usize) -> Option<ObjectId> {
        self.pages.get(index).map(|&(_, id)| id)
    }

    /// 沿 Parent 鏈尋找頁面繼承的屬性
    fn inherited(&self, page: &Dictionary, key: &[u8]) -> Option<Object> {
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        for _ in 0..MAX_TREE_DEPTH {
            let node = self.document.get_dictionary(parent?).ok()?;
            if let Ok(value) = node.get(key) {
                return Some(value.clone());
            }
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        }
        None
    }
}

fn is_page_node(object: &Object) -> bool {
    match object {
        Object::Dictionary(dict) => matches!(
            dict.get(b"Type").and_then(Object::as_name),
            Ok(b"Page") | Ok(b"Pages")
        ),
        _ => false,
    }
}

fn collect_references(object: &Object, out: &mut Vec<ObjectId>) {
    match object {
        Object::Reference(id) => out.push(*id),
        Object::Array(items) => items.iter().for_each(|item| collect_references(item, out)),
        Object::Dictionary(dict) => dict.iter().for_each(|(_, value)| collect_references(value, out)),
        Object::Stream(stream) => stream
            .dict
            .iter()
            .for_each(|(_, value)| collect_references(value, out)),
        _ => {}
    }
}

impl SourceDocument for PdfSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String> {
        let page_number = self
            .page_number(index)
            .ok_or_else(|| SplitError::page_extraction(index + 1, "page out of range"))?;

        self.document
            .extract_text(&[page_number])
            .map_err(|e| SplitError::page_extraction(index + 1, e))
    }

    /// 只複製所選頁面及其引用到的物件，保留原始頁序
    ///
    /// Other pages are never copied, even when an annotation or link on a
    /// selected page points at them; such references are left dangling.
    fn write_pages(&self, indices: &[usize], dest: &Path) -> Result<()> {
        let dest_label = dest.display().to_string();
        let page_ids: Vec<ObjectId> = indices
            .iter()
            .map(|&i| {
                self.page_id(i)
                    .ok_or_else(|| SplitError::write(&dest_label, format!("page {} out of range", i + 1)))
            })
            .collect::<Result<_>>()?;

        let mut subset = Document::with_version(self.document.version.clone());
        let pages_id: ObjectId = (self.document.max_id + 1, 0);
        let catalog_id: ObjectId = (self.document.max_id + 2, 0);
        let mut pending: Vec<ObjectId> = Vec::new();

        for &page_id in &page_ids {
            let mut page = self
                .document
                .get_dictionary(page_id)
                .map_err(|e| SplitError::write(&dest_label, e))?
                .clone();
            for key in INHERITABLE_KEYS {
                if !page.has(key) {
                    if let Some(value) = self.inherited(&page, key) {
                        page.set(key, value);
                    }
                }
            }
            page.set("Parent", pages_id);

            for (key, value) in page.iter() {
                if key.as_slice() != b"Parent" {
                    collect_references(value, &mut pending);
                }
            }
            subset.objects.insert(page_id, Object::Dictionary(page));
        }

        let mut seen: HashSet<ObjectId> = page_ids.iter().copied().collect();
        while let Some(id) = pending.pop() {
            if !seen.insert(id) {
                continue;
            }
            let Ok(object) = self.document.get_object(id) else {
                continue;
            };
            if is_page_node(object) {
                continue;
            }
            collect_references(object, &mut pending);
            subset.objects.insert(id, object.clone());
        }

        let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
        let count = kids.len() as i64;
        subset.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        subset.objects.insert(
            catalog_id,
            Object::Dictionary(dictionary! {
                "Type" => "Catalog",
                "Pages" => pages_id,
            }),
        );
        subset.trailer.set("Root", catalog_id);
        subset.max_id = catalog_id.0;

        subset.compress();
        subset
            .save(dest)
            .map_err(|e| SplitError::write(&dest_label, e))?;

        Ok(())
    }
}
