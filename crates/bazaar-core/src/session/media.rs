use crate::domain::MediaKind;

/// Hard cap on attachments per listing.
pub const MEDIA_LIMIT: usize = 5;

/// One buffered attachment: downloaded bytes plus the declared kind.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaItem {
    pub bytes: Vec<u8>,
    pub kind: MediaKind,
}

/// Bounded, ordered buffer of attachments collected across the media step.
///
/// Overflow keeps the FIRST five items and drops the rest; the buffer stays
/// open until the user sends the completion word.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaBuffer {
    items: Vec<MediaItem>,
    accepting_more: bool,
}

impl Default for MediaBuffer {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            accepting_more: true,
        }
    }
}

impl MediaBuffer {
    pub fn append(&mut self, bytes: Vec<u8>, kind: MediaKind) {
        self.items.push(MediaItem { bytes, kind });
        self.items.truncate(MEDIA_LIMIT);
    }

    /// Drop everything buffered so far ("resend").
    pub fn clear(&mut self) {
        self.items.clear();
        self.accepting_more = true;
    }

    /// Close the buffer; the only path that lets the validator move past the
    /// media step.
    pub fn mark_complete(&mut self) {
        self.accepting_more = false;
    }

    pub fn accepting_more(&self) -> bool {
        self.accepting_more
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(tag: u8) -> Vec<u8> {
        vec![tag]
    }

    #[test]
    fn overflow_keeps_the_first_five_in_order() {
        let mut buffer = MediaBuffer::default();
        for tag in 1..=7u8 {
            buffer.append(item(tag), MediaKind::Image);
        }

        assert_eq!(buffer.len(), MEDIA_LIMIT);
        let tags: Vec<u8> = buffer.items().iter().map(|m| m.bytes[0]).collect();
        assert_eq!(tags, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn clear_reopens_the_buffer() {
        let mut buffer = MediaBuffer::default();
        buffer.append(item(1), MediaKind::Video);
        buffer.mark_complete();
        assert!(!buffer.accepting_more());

        buffer.clear();
        assert!(buffer.is_empty());
        assert!(buffer.accepting_more());
    }

    #[test]
    fn completion_only_flips_the_flag() {
        let mut buffer = MediaBuffer::default();
        buffer.append(item(1), MediaKind::Image);
        buffer.mark_complete();
        assert_eq!(buffer.len(), 1);
        assert!(!buffer.accepting_more());
    }
}
