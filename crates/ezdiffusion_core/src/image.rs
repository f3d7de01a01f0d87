pub const MIN_BRUSH_SIZE: u32 = 1;
pub const MAX_BRUSH_SIZE: u32 = 100;
pub const MIN_PREVIEW_ZOOM: f32 = 0.1;
pub const MAX_PREVIEW_ZOOM: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Generated,
    Imported,
    Camera,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub id: String,
    /// Base64 data URI or file/remote URI.
    pub uri: String,
    pub width: u32,
    pub height: u32,
    pub mime_type: String,
    pub source: ImageSource,
}

impl ImageRef {
    /// Wraps an existing URI. Dimensions stay zero until something measures the image.
    pub fn import(id: impl Into<String>, uri: impl Into<String>, source: ImageSource) -> Self {
        let uri = uri.into();
        let mime_type = if uri.starts_with("data:image/png") {
            "image/png"
        } else {
            "image/jpeg"
        };
        Self {
            id: id.into(),
            mime_type: mime_type.to_string(),
            uri,
            width: 0,
            height: 0,
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskRef {
    pub id: String,
    pub uri: String,
    pub width: u32,
    pub height: u32,
    pub brush_size: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageState {
    pub input_image: Option<ImageRef>,
    pub output_image: Option<ImageRef>,
    pub mask: Option<MaskRef>,
    pub brush_size: u32,
    pub is_drawing: bool,
    pub show_mask: bool,
    pub preview_zoom: f32,
}

impl Default for ImageState {
    fn default() -> Self {
        Self {
            input_image: None,
            output_image: None,
            mask: None,
            brush_size: 20,
            is_drawing: false,
            show_mask: true,
            preview_zoom: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageMsg {
    SetOutputImage(Option<ImageRef>),
    ClearOutputImage,
    UseOutputAsInput,
    SetInputImage(Option<ImageRef>),
    SetMask(Option<MaskRef>),
    SetBrushSize(u32),
    SetIsDrawing(bool),
    SetShowMask(bool),
    SetPreviewZoom(f32),
    Reset,
}

pub fn reduce(mut image: ImageState, msg: ImageMsg) -> ImageState {
    match msg {
        ImageMsg::SetOutputImage(output) => image.output_image = output,
        ImageMsg::ClearOutputImage => image.output_image = None,
        ImageMsg::UseOutputAsInput => {
            if let Some(output) = image.output_image.take() {
                image.input_image = Some(output);
                image.mask = None;
            }
        }
        ImageMsg::SetInputImage(input) => image.input_image = input,
        ImageMsg::SetMask(mask) => image.mask = mask,
        ImageMsg::SetBrushSize(size) => {
            image.brush_size = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
        }
        ImageMsg::SetIsDrawing(drawing) => image.is_drawing = drawing,
        ImageMsg::SetShowMask(show) => image.show_mask = show,
        ImageMsg::SetPreviewZoom(zoom) => {
            image.preview_zoom = zoom.clamp(MIN_PREVIEW_ZOOM, MAX_PREVIEW_ZOOM);
        }
        ImageMsg::Reset => image = ImageState::default(),
    }
    image
}
