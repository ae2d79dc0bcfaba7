use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::db::StoreError;
use crate::db::repository::Repository;
use crate::models::{MediaItem, MediaType, WeeklyCategory};

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("no media item with id {0}")]
    NotFound(i64),

    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaFilter {
    #[default]
    All,
    Only(MediaType),
}

impl MediaFilter {
    fn media_type(&self) -> Option<MediaType> {
        match self {
            MediaFilter::All => None,
            MediaFilter::Only(t) => Some(*t),
        }
    }

    fn groups_weekly(&self) -> bool {
        matches!(self, MediaFilter::All | MediaFilter::Only(MediaType::Weekly))
    }
}

impl FromStr for MediaFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(MediaFilter::All)
        } else {
            Ok(MediaFilter::Only(s.parse()?))
        }
    }
}

#[derive(Debug, Default)]
pub struct MediaListing {
    /// Weekly teachings under their category, in timetable order.
    pub weekly: Vec<(WeeklyCategory, Vec<MediaItem>)>,
    pub items: Vec<MediaItem>,
}

impl MediaListing {
    pub fn is_empty(&self) -> bool {
        self.weekly.is_empty() && self.items.is_empty()
    }
}

pub fn list_media(repo: &dyn Repository, filter: MediaFilter) -> Result<MediaListing, StoreError> {
    let all = repo.list_media(filter.media_type())?;
    if !filter.groups_weekly() {
        return Ok(MediaListing {
            weekly: Vec::new(),
            items: all,
        });
    }

    let (weekly, items): (Vec<MediaItem>, Vec<MediaItem>) = all
        .into_iter()
        .partition(|m| m.media_type == MediaType::Weekly && m.weekly_category.is_some());

    let groups = WeeklyCategory::ALL
        .iter()
        .filter_map(|&category| {
            let members: Vec<MediaItem> = weekly
                .iter()
                .filter(|m| m.weekly_category == Some(category))
                .cloned()
                .collect();
            (!members.is_empty()).then_some((category, members))
        })
        .collect();

    Ok(MediaListing {
        weekly: groups,
        items,
    })
}

/// Write the item's bytes into `dir` and count the download.
pub fn download(repo: &dyn Repository, id: i64, dir: &Path) -> Result<PathBuf, MediaError> {
    let upload = repo.get_media(id)?.ok_or(MediaError::NotFound(id))?;

    // Stored names come from uploads; never let one escape `dir`.
    let name = Path::new(&upload.item.file_name)
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| format!("media-{}", id).into());
    let path = dir.join(name);

    std::fs::write(&path, &upload.data).map_err(|source| MediaError::Write {
        path: path.clone(),
        source,
    })?;
    repo.record_download(id)?;
    log::info!("downloaded media {} to {}", id, path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::SqliteRepository;
    use crate::models::MediaUpload;
    use chrono::Utc;

    fn add(repo: &SqliteRepository, title: &str, t: MediaType, w: Option<WeeklyCategory>) -> i64 {
        repo.add_media(&MediaUpload {
            item: MediaItem {
                id: None,
                title: title.to_string(),
                media_type: t,
                weekly_category: w,
                description: String::new(),
                teacher: String::new(),
                file_name: format!("../{}.pdf", title),
                file_size: 0,
                mime_type: "application/pdf".to_string(),
                uploaded_at: Utc::now(),
                download_count: 0,
            },
            data: title.as_bytes().to_vec(),
        })
        .unwrap()
    }

    #[test]
    fn weekly_items_are_grouped_in_timetable_order() {
        let repo = SqliteRepository::in_memory().unwrap();
        add(&repo, "tafsir-1", MediaType::Weekly, Some(WeeklyCategory::Tafsir));
        add(&repo, "tawheed-1", MediaType::Weekly, Some(WeeklyCategory::Tawheed));
        add(&repo, "book", MediaType::Books, None);

        let all = list_media(&repo, MediaFilter::All).unwrap();
        assert_eq!(all.items.len(), 1);
        let order: Vec<_> = all.weekly.iter().map(|(c, _)| *c).collect();
        assert_eq!(order, vec![WeeklyCategory::Tawheed, WeeklyCategory::Tafsir]);

        let books = list_media(&repo, "books".parse().unwrap()).unwrap();
        assert!(books.weekly.is_empty());
        assert_eq!(books.items[0].title, "book");

        let audio = list_media(&repo, MediaFilter::Only(MediaType::Audio)).unwrap();
        assert!(audio.is_empty());
    }

    #[test]
    fn download_writes_file_and_counts() {
        let repo = SqliteRepository::in_memory().unwrap();
        let id = add(&repo, "notes", MediaType::Documents, None);
        let dir = tempfile::tempdir().unwrap();

        let path = download(&repo, id, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("notes.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"notes");
        assert_eq!(repo.list_media(None).unwrap()[0].download_count, 1);

        assert!(matches!(
            download(&repo, id + 1, dir.path()),
            Err(MediaError::NotFound(_))
        ));
    }
}
