//! PDF document utilities
//!
//! Thin helpers over `lopdf`: open and validate downloaded bytes, count pages,
//! merge several documents into one, and write documents to disk.

use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::{Path, PathBuf};

use crate::{FetcharooError, Result};

/// How [`save_pdf`] treats an existing file at the target path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Create or truncate the target
    Overwrite,
    /// Pick `name_1.pdf`, `name_2.pdf`, ... when the target exists
    Unique,
}

/// Parses PDF bytes into a document
///
/// # Arguments
///
/// * `bytes` - Raw PDF content
/// * `source_name` - Used in the error when the bytes are not a PDF
pub fn open_pdf(bytes: &[u8], source_name: &str) -> Result<Document> {
    if !bytes.starts_with(crate::download::PDF_MAGIC) {
        return Err(FetcharooError::InvalidPdf {
            source_name: source_name.to_string(),
            reason: "missing %PDF header".to_string(),
        });
    }

    Document::load_mem(bytes).map_err(|e| FetcharooError::InvalidPdf {
        source_name: source_name.to_string(),
        reason: e.to_string(),
    })
}

/// Number of pages in a document
pub fn page_count(document: &Document) -> usize {
    document.get_pages().len()
}

/// Opens the bytes and checks the document has at least one page
pub fn validate_pdf(bytes: &[u8], source_name: &str) -> Result<Document> {
    let document = open_pdf(bytes, source_name)?;
    if page_count(&document) == 0 {
        return Err(FetcharooError::InvalidPdf {
            source_name: source_name.to_string(),
            reason: "document has no pages".to_string(),
        });
    }
    Ok(document)
}

/// Merges PDF payloads into one document, in order
///
/// Inputs that cannot be opened or have no pages are skipped with a warning.
/// Fails only when nothing usable is left.
pub fn merge_pdfs(contents: &[Vec<u8>]) -> Result<Document> {
    let documents: Vec<Document> = contents
        .iter()
        .enumerate()
        .filter_map(|(index, bytes)| {
            let name = format!("input #{}", index + 1);
            match validate_pdf(bytes, &name) {
                Ok(document) => Some(document),
                Err(e) => {
                    tracing::warn!("Skipping PDF during merge: {}", e);
                    None
                }
            }
        })
        .collect();

    merge_documents(documents)
}

/// Merges already-opened documents into one, preserving page order
///
/// Each input's objects are renumbered into a shared id space. The first
/// catalog and page tree become the merged document's, every page is
/// re-parented onto that tree, and outlines are dropped. Attributes a page
/// inherited from its own page tree are copied onto the page first.
pub fn merge_documents(documents: Vec<Document>) -> Result<Document> {
    let mut max_id = 1;
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut objects: Vec<(ObjectId, Object)> = Vec::new();

    for mut document in documents {
        document.renumber_objects_with(max_id);
        max_id = document.max_id + 1;

        for (_, page_id) in document.get_pages() {
            let mut page = document.get_dictionary(page_id)?.clone();
            inherit_page_attributes(&document, &mut page);
            pages.push((page_id, page));
        }
        objects.extend(document.objects);
    }

    if pages.is_empty() {
        return Err(FetcharooError::InvalidPdf {
            source_name: "merge".to_string(),
            reason: "no input contained any pages".to_string(),
        });
    }

    let mut merged = Document::with_version("1.5");
    let mut catalog: Option<(ObjectId, Object)> = None;
    let mut page_tree: Option<(ObjectId, Object)> = None;

    for (object_id, object) in objects {
        match object_type(&object) {
            Some(b"Catalog") => {
                if catalog.is_none() {
                    catalog = Some((object_id, object));
                }
            }
            Some(b"Pages") => {
                if page_tree.is_none() {
                    page_tree = Some((object_id, object));
                }
            }
            Some(b"Page") | Some(b"Outlines") | Some(b"Outline") => {}
            _ => {
                merged.objects.insert(object_id, object);
            }
        }
    }

    let (Some((catalog_id, catalog)), Some((tree_id, tree))) = (catalog, page_tree) else {
        return Err(FetcharooError::InvalidPdf {
            source_name: "merge".to_string(),
            reason: "input is missing a catalog or page tree".to_string(),
        });
    };

    let page_count = pages.len() as i64;
    let mut kids = Vec::with_capacity(pages.len());
    for (page_id, mut page) in pages {
        page.set("Parent", tree_id);
        merged.objects.insert(page_id, Object::Dictionary(page));
        kids.push(Object::Reference(page_id));
    }

    let mut tree = tree.as_dict()?.clone();
    tree.set("Count", page_count);
    tree.set("Kids", kids);
    tree.remove(b"Parent");
    merged.objects.insert(tree_id, Object::Dictionary(tree));

    let mut catalog = catalog.as_dict()?.clone();
    catalog.set("Pages", tree_id);
    catalog.remove(b"Outlines");
    merged.objects.insert(catalog_id, Object::Dictionary(catalog));

    merged.trailer.set("Root", catalog_id);
    merged.max_id = merged.objects.keys().map(|(id, _)| *id).max().unwrap_or(0);
    merged.renumber_objects();
    merged.compress();

    Ok(merged)
}

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_PAGE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Bounds the walk up a malformed, cyclic page tree
const MAX_PAGE_TREE_DEPTH: usize = 64;

/// Copies inherited attributes onto `page` where it does not set them itself
///
/// The nearest ancestor that sets a key wins.
fn inherit_page_attributes(document: &Document, page: &mut Dictionary) {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    for _ in 0..MAX_PAGE_TREE_DEPTH {
        let Some(node) = parent.and_then(|id| document.get_dictionary(id).ok()) else {
            break;
        };
        for key in INHERITABLE_PAGE_KEYS {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key, value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
}

fn object_type(object: &Object) -> Option<&[u8]> {
    object.as_dict().ok()?.get(b"Type").ok()?.as_name().ok()
}

/// Serializes a document to bytes
pub fn pdf_to_bytes(document: &mut Document) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}

/// Writes a document to disk
///
/// # Returns
///
/// The path actually written, which differs from `path` only in
/// [`SaveMode::Unique`] when the target already existed.
pub fn save_pdf(document: &mut Document, path: &Path, mode: SaveMode) -> Result<PathBuf> {
    let target = match mode {
        SaveMode::Overwrite => path.to_path_buf(),
        SaveMode::Unique => {
            let dir = path.parent().unwrap_or_else(|| Path::new(""));
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| crate::url::DEFAULT_FILENAME.to_string());
            unique_path(dir, &file_name)
        }
    };

    let bytes = pdf_to_bytes(document)?;
    std::fs::write(&target, bytes)?;
    tracing::debug!("Wrote {}", target.display());
    Ok(target)
}

/// Returns a path in `dir` for `file_name` that does not exist yet
///
/// The name itself is used when free; otherwise `_1`, `_2`, ... is appended to
/// the stem and the extension becomes `.pdf`.
///
/// # Examples
///
/// ```
/// use fetcharoo::pdf::unique_path;
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("doc.pdf"), b"x").unwrap();
/// assert_eq!(unique_path(dir.path(), "doc.pdf"), dir.path().join("doc_1.pdf"));
/// ```
pub fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut counter = 1u32;
    loop {
        let candidate = dir.join(format!("{}_{}.pdf", stem, counter));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Returns true if a file named `file_name` exists in `dir`
pub fn pdf_exists(file_name: &str, dir: &Path) -> bool {
    dir.join(file_name).is_file()
}

/// Builds a PDF with `pages` empty pages `width` points wide, for tests
///
/// With `inherited` the MediaBox sits on the page tree instead of each page.
#[cfg(test)]
pub(crate) fn build_test_pdf(pages: usize, width: i64, inherited: bool) -> Vec<u8> {
    use lopdf::dictionary;

    let media_box = || Object::Array(vec![0.into(), 0.into(), width.into(), 842.into()]);
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
            };
            if !inherited {
                page.set("MediaBox", media_box());
            }
            doc.add_object(page).into()
        })
        .collect();
    let mut tree = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => pages as i64,
    };
    if inherited {
        tree.set("MediaBox", media_box());
    }
    doc.objects.insert(pages_id, Object::Dictionary(tree));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Builds a minimal PDF with `pages` empty A4 pages, for tests
#[cfg(test)]
pub(crate) fn sample_pdf(pages: usize) -> Vec<u8> {
    build_test_pdf(pages, 595, false)
}

/// Width of each page's own MediaBox, in page order, for tests
#[cfg(test)]
pub(crate) fn page_widths(document: &Document) -> Vec<Option<i64>> {
    document
        .get_pages()
        .values()
        .map(|&id| {
            document
                .get_dictionary(id)
                .ok()?
                .get(b"MediaBox")
                .ok()?
                .as_array()
                .ok()?
                .get(2)?
                .as_i64()
                .ok()
        })
        .collect()
}
