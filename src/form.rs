//! Editable generation parameters and their validation.

use crate::catalog;
use crate::error::ValidationError;
use crate::model::{DocumentUpload, GenerationInput, GenerationRequest, InputMode};
use std::ops::RangeInclusive;

pub const TOPIC_SLIDE_RANGE: RangeInclusive<u8> = 5..=10;
pub const CHAPTER_SLIDE_RANGE: RangeInclusive<u8> = 2..=10;

fn clamp_to(range: &RangeInclusive<u8>, value: u8) -> u8 {
    value.clamp(*range.start(), *range.end())
}

/// Form fields for both input modes. Switching modes keeps the other mode's
/// fields; only the active mode is read by [`FormState::validate`].
#[derive(Debug, Clone)]
pub struct FormState {
    mode: InputMode,
    topic: String,
    slide_count: u8,
    document: Option<DocumentUpload>,
    slides_per_chapter: u8,
    template_id: String,
    color_scheme_id: String,
    custom_instructions: String,
    generate_pdf: bool,
    use_images: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            mode: InputMode::Topic,
            topic: String::new(),
            slide_count: *TOPIC_SLIDE_RANGE.end(),
            document: None,
            slides_per_chapter: *CHAPTER_SLIDE_RANGE.end(),
            template_id: catalog::DEFAULT_TEMPLATE.to_string(),
            color_scheme_id: catalog::DEFAULT_COLOR_SCHEME.to_string(),
            custom_instructions: String::new(),
            generate_pdf: false,
            use_images: false,
        }
    }
}

impl FormState {
    pub fn input_mode(&self) -> InputMode {
        self.mode
    }

    pub fn set_input_mode(&mut self, mode: InputMode) {
        self.mode = mode;
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.topic = topic.into();
    }

    pub fn slide_count(&self) -> u8 {
        self.slide_count
    }

    /// Clamped to [`TOPIC_SLIDE_RANGE`].
    pub fn set_slide_count(&mut self, count: u8) {
        self.slide_count = clamp_to(&TOPIC_SLIDE_RANGE, count);
    }

    pub fn document(&self) -> Option<&DocumentUpload> {
        self.document.as_ref()
    }

    pub fn attach_document(&mut self, document: DocumentUpload) {
        self.document = Some(document);
    }

    pub fn detach_document(&mut self) {
        self.document = None;
    }

    pub fn slides_per_chapter(&self) -> u8 {
        self.slides_per_chapter
    }

    /// Clamped to [`CHAPTER_SLIDE_RANGE`].
    pub fn set_slides_per_chapter(&mut self, count: u8) {
        self.slides_per_chapter = clamp_to(&CHAPTER_SLIDE_RANGE, count);
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn set_template(&mut self, id: impl Into<String>) {
        self.template_id = id.into();
    }

    pub fn color_scheme_id(&self) -> &str {
        &self.color_scheme_id
    }

    pub fn set_color_scheme(&mut self, id: impl Into<String>) {
        self.color_scheme_id = id.into();
    }

    pub fn set_custom_instructions(&mut self, text: impl Into<String>) {
        self.custom_instructions = text.into();
    }

    pub fn set_generate_pdf(&mut self, enabled: bool) {
        self.generate_pdf = enabled;
    }

    pub fn set_use_images(&mut self, enabled: bool) {
        self.use_images = enabled;
    }

    /// Build a request from the active mode's fields.
    pub fn validate(&self) -> Result<GenerationRequest, ValidationError> {
        let input = match self.mode {
            InputMode::Topic => {
                if self.topic.trim().is_empty() {
                    return Err(ValidationError::MissingTopic);
                }
                GenerationInput::Topic {
                    topic: self.topic.clone(),
                    slide_count: self.slide_count,
                }
            }
            InputMode::Document => {
                let document = self
                    .document
                    .clone()
                    .ok_or(ValidationError::MissingDocument)?;
                GenerationInput::Document {
                    document,
                    slides_per_chapter: self.slides_per_chapter,
                }
            }
        };

        if catalog::template(&self.template_id).is_none() {
            return Err(ValidationError::UnknownTemplate(self.template_id.clone()));
        }
        if catalog::color_scheme(&self.color_scheme_id).is_none() {
            return Err(ValidationError::UnknownColorScheme(
                self.color_scheme_id.clone(),
            ));
        }

        let custom_instructions = Some(self.custom_instructions.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(GenerationRequest {
            input,
            template_id: self.template_id.clone(),
            color_scheme_id: self.color_scheme_id.clone(),
            custom_instructions,
            generate_pdf: self.generate_pdf,
            use_images: self.use_images,
        })
    }
}
