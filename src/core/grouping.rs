use crate::domain::model::{GroupStatus, LogicalGroup, PageScan};

/// 串流分組器：逐頁 push，遇到新表頭或結尾時吐出已關閉的組
///
/// In grouping mode the accumulator is the currently open group (or none).
/// Non-grouping mode never keeps a group open.
#[derive(Debug)]
pub struct Grouper {
    group_multipage: bool,
    open: Option<LogicalGroup>,
    next_index: usize,
}

impl Grouper {
    pub fn new(group_multipage: bool) -> Self {
        Self {
            group_multipage,
            open: None,
            next_index: 0,
        }
    }

    /// Feed the scan of the next page (pages must arrive in order).
    ///
    /// Returns the group closed by this page, if any.
    pub fn push(&mut self, scan: PageScan) -> Option<LogicalGroup> {
        let index = self.next_index;
        self.next_index += 1;

        if !self.group_multipage {
            let group = match scan {
                PageScan::Marked(markers) => {
                    LogicalGroup::open(index, Some(markers), GroupStatus::Ok)
                }
                PageScan::Unmarked => LogicalGroup::open(index, None, GroupStatus::Fallback),
                PageScan::Failed(message) => LogicalGroup::failed(index, message),
            };
            return Some(group);
        }

        match scan {
            PageScan::Marked(markers) => {
                self.open
                    .replace(LogicalGroup::open(index, Some(markers), GroupStatus::Ok))
            }
            PageScan::Unmarked => match self.open.as_mut() {
                Some(group) => {
                    group.span.end = index;
                    None
                }
                None => Some(LogicalGroup::open(index, None, GroupStatus::Orphan)),
            },
            PageScan::Failed(message) => match self.open.as_mut() {
                Some(group) => {
                    group.span.end = index;
                    group.mark_error(message);
                    None
                }
                None => Some(LogicalGroup::failed(index, message)),
            },
        }
    }

    /// 結束掃描（文件結尾或取消），關閉仍開啟的組
    pub fn finish(&mut self) -> Option<LogicalGroup> {
        self.open.take()
    }

    pub fn pages_seen(&self) -> usize {
        self.next_index
    }
}

/// Pure fold from an ordered page scan sequence to its logical groups.
pub fn group_pages<I>(scans: I, group_multipage: bool) -> Vec<LogicalGroup>
where
    I: IntoIterator<Item = PageScan>,
{
    let mut grouper = Grouper::new(group_multipage);
    let mut groups = scans.into_iter().fold(Vec::new(), |mut acc, scan| {
        acc.extend(grouper.push(scan));
        acc
    });
    groups.extend(grouper.finish());
    groups
}
