use crate::{CreateError, DeleteError, ExerciseID, MachineID, UserID};

#[allow(async_fn_in_trait)]
pub trait ObjectStorageRepository {
    /// Stores the object and returns its download URL.
    async fn upload_object(&self, path: &str, upload: &Upload) -> Result<String, CreateError>;
    async fn delete_object(&self, url: &str) -> Result<(), DeleteError>;
}

/// A file picked by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    #[must_use]
    pub fn media_kind(&self) -> Option<MediaKind> {
        MediaKind::detect(&self.content_type, &self.file_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    #[must_use]
    pub fn detect(content_type: &str, file_name: &str) -> Option<Self> {
        let content_type = content_type.to_ascii_lowercase();
        if content_type.starts_with("image/") {
            return Some(MediaKind::Image);
        }
        if content_type.starts_with("video/") {
            return Some(MediaKind::Video);
        }

        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())?;
        match extension.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "avif" | "svg" => Some(MediaKind::Image),
            "mp4" | "webm" | "mov" | "m4v" | "ogv" => Some(MediaKind::Video),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl TryFrom<&str> for MediaKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "image" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            _ => Err(format!("unknown media type: {value}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub url: String,
    pub kind: MediaKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaOwner {
    ProfilePhoto(UserID),
    Machine(MachineID),
    Exercise(ExerciseID),
}

/// Object path of an uploaded file, e.g. `machines/{id}/{timestamp}_{file}`.
#[must_use]
pub fn storage_path(owner: &MediaOwner, timestamp_ms: i64, file_name: &str) -> String {
    let (prefix, id) = match owner {
        MediaOwner::ProfilePhoto(id) => ("profile_photos", id.as_str()),
        MediaOwner::Machine(id) => ("machines", id.as_str()),
        MediaOwner::Exercise(id) => ("exercises", id.as_str()),
    };
    format!("{prefix}/{id}/{timestamp_ms}_{}", sanitize_file_name(file_name))
}

fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let sanitized = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>();
    if sanitized.trim_matches('.').is_empty() {
        "file".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("image/png", "a.bin", Some(MediaKind::Image))]
    #[case("video/mp4", "a.bin", Some(MediaKind::Video))]
    #[case("", "clip.MOV", Some(MediaKind::Video))]
    #[case("application/octet-stream", "photo.jpeg", Some(MediaKind::Image))]
    #[case("application/pdf", "manual.pdf", None)]
    #[case("", "noextension", None)]
    fn test_media_kind_detect(
        #[case] content_type: &str,
        #[case] file_name: &str,
        #[case] expected: Option<MediaKind>,
    ) {
        assert_eq!(MediaKind::detect(content_type, file_name), expected);
    }

    #[rstest]
    #[case(
        MediaOwner::ProfilePhoto(UserID::from("u1")),
        "me.jpg",
        "profile_photos/u1/1700000000000_me.jpg"
    )]
    #[case(
        MediaOwner::Machine(MachineID::from("m1")),
        "leg press (front).png",
        "machines/m1/1700000000000_leg_press__front_.png"
    )]
    #[case(
        MediaOwner::Exercise(ExerciseID::from("e1")),
        "C:\\videos\\squat.mp4",
        "exercises/e1/1700000000000_squat.mp4"
    )]
    #[case(MediaOwner::Machine(MachineID::from("m1")), "..", "machines/m1/1700000000000_file")]
    fn test_storage_path(
        #[case] owner: MediaOwner,
        #[case] file_name: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(storage_path(&owner, 1_700_000_000_000, file_name), expected);
    }
}
