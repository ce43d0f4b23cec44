//! The known files in the vendor's feed directory.

use std::path::{Path, PathBuf};

/// One of the files published in the distributor's feed directory.
///
/// Remote paths are fixed by the vendor; local names mirror the remote
/// file names so a feed directory on disk reads like the FTP listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFile {
    /// Full inventory dump, `;`-delimited, 77 positional fields.
    Inventory,
    /// Intraday stock-number,quantity pairs, comma-delimited.
    Quantities,
    /// Stock numbers removed from the vendor catalog, `;`-delimited.
    Deletions,
    /// Per-item attribute reference data. Downloadable, not parsed here.
    Attributes,
    /// Department/category reference data. Downloadable, not parsed here.
    Categories,
}

impl FeedFile {
    /// Every known feed file, in the order a full pull downloads them.
    pub const ALL: [FeedFile; 5] = [
        FeedFile::Inventory,
        FeedFile::Quantities,
        FeedFile::Deletions,
        FeedFile::Attributes,
        FeedFile::Categories,
    ];

    /// The vendor's file name, shared by the remote listing and the local copy.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            FeedFile::Inventory => "rsrinventory-new.txt",
            FeedFile::Quantities => "IM-QTY-CSV.csv",
            FeedFile::Deletions => "rsrdeletedinv.txt",
            FeedFile::Attributes => "attributes-all.txt",
            FeedFile::Categories => "categories.txt",
        }
    }

    /// Path on the FTPS server, relative to the login directory.
    #[must_use]
    pub fn remote_path(self) -> &'static str {
        match self {
            FeedFile::Inventory => "ftpdownloads/rsrinventory-new.txt",
            FeedFile::Quantities => "ftpdownloads/IM-QTY-CSV.csv",
            FeedFile::Deletions => "ftpdownloads/rsrdeletedinv.txt",
            FeedFile::Attributes => "ftpdownloads/attributes-all.txt",
            FeedFile::Categories => "ftpdownloads/categories.txt",
        }
    }

    /// Where the file lands under the local feed directory.
    #[must_use]
    pub fn local_path(self, feed_dir: &Path) -> PathBuf {
        feed_dir.join(self.file_name())
    }
}
