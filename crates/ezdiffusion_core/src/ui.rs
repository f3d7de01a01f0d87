use std::time::Duration;

pub const MIN_TEXT_SCALE: f32 = 0.5;
pub const MAX_TEXT_SCALE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalKind {
    #[default]
    None,
    LoraEditor,
    ControlNetEditor,
    ModifierSelector,
    ImagePicker,
    Settings,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modal {
    pub kind: ModalKind,
    /// Modal-specific payload, e.g. the index of the modifier being edited.
    pub data: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenSize {
    #[default]
    Mobile,
    Tablet,
    Desktop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SafeAreaInsets {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SafeAreaInsetsPatch {
    pub top: Option<u32>,
    pub bottom: Option<u32>,
    pub left: Option<u32>,
    pub right: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Input,
    Output,
    Control,
    Modifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelVisibility {
    pub input: bool,
    pub output: bool,
    pub control: bool,
    pub modifier: bool,
}

impl Default for PanelVisibility {
    fn default() -> Self {
        Self {
            input: true,
            output: true,
            control: true,
            modifier: true,
        }
    }
}

impl PanelVisibility {
    pub fn get(&self, panel: Panel) -> bool {
        match panel {
            Panel::Input => self.input,
            Panel::Output => self.output,
            Panel::Control => self.control,
            Panel::Modifier => self.modifier,
        }
    }

    fn set(&mut self, panel: Panel, visible: bool) {
        match panel {
            Panel::Input => self.input = visible,
            Panel::Output => self.output = visible,
            Panel::Control => self.control = visible,
            Panel::Modifier => self.modifier = visible,
        }
    }
}

pub type ToastId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

/// A toast before it has been assigned an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastRequest {
    pub kind: ToastKind,
    pub title: String,
    pub message: Option<String>,
    pub duration: Option<Duration>,
}

impl ToastRequest {
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            title: title.into(),
            message: Some(message.into()),
            duration: Some(Duration::from_secs(5)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub kind: ToastKind,
    pub title: String,
    pub message: Option<String>,
    pub duration: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub current_modal: Modal,
    pub modal_history: Vec<ModalKind>,
    pub theme: ThemeMode,
    pub screen_size: ScreenSize,
    pub orientation: Orientation,
    pub safe_area_insets: SafeAreaInsets,
    pub panels: PanelVisibility,
    pub is_loading: bool,
    pub loading_message: String,
    pub toasts: Vec<Toast>,
    next_toast_id: ToastId,
    pub is_online: bool,
    pub is_background: bool,
    pub is_keyboard_visible: bool,
    pub keyboard_height: u32,
    pub reduce_motion: bool,
    pub high_contrast: bool,
    pub text_scale: f32,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            current_modal: Modal::default(),
            modal_history: Vec::new(),
            theme: ThemeMode::System,
            screen_size: ScreenSize::Mobile,
            orientation: Orientation::Portrait,
            safe_area_insets: SafeAreaInsets::default(),
            panels: PanelVisibility::default(),
            is_loading: false,
            loading_message: String::new(),
            toasts: Vec::new(),
            next_toast_id: 1,
            is_online: true,
            is_background: false,
            is_keyboard_visible: false,
            keyboard_height: 0,
            reduce_motion: false,
            high_contrast: false,
            text_scale: 1.0,
        }
    }
}

impl UiState {
    /// Appends a toast and returns the id it was given.
    pub fn push_toast(&mut self, request: ToastRequest) -> ToastId {
        let id = self.next_toast_id;
        self.next_toast_id += 1;
        self.toasts.push(Toast {
            id,
            kind: request.kind,
            title: request.title,
            message: request.message,
            duration: request.duration,
        });
        id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiMsg {
    OpenModal { kind: ModalKind, data: Option<usize> },
    CloseModal,
    GoBackModal,
    SetThemeMode(ThemeMode),
    ToggleTheme,
    SetScreenSize(ScreenSize),
    SetOrientation(Orientation),
    SetSafeAreaInsets(SafeAreaInsetsPatch),
    TogglePanel(Panel),
    SetPanelVisibility { panel: Panel, visible: bool },
    ResetPanelVisibility,
    SetLoading { is_loading: bool, message: Option<String> },
    AddToast(ToastRequest),
    RemoveToast(ToastId),
    ClearToasts,
    SetOnlineStatus(bool),
    SetBackgroundStatus(bool),
    SetKeyboardVisible { visible: bool, height: Option<u32> },
    SetReduceMotion(bool),
    SetHighContrast(bool),
    SetTextScale(f32),
    Reset,
}

/// Pure UI reducer. Toast expiry scheduling is left to the caller.
pub fn reduce(mut ui: UiState, msg: UiMsg) -> UiState {
    match msg {
        UiMsg::OpenModal { kind, data } => {
            if ui.current_modal.kind != ModalKind::None {
                ui.modal_history.push(ui.current_modal.kind);
            }
            ui.current_modal = Modal { kind, data };
        }
        UiMsg::CloseModal => {
            ui.current_modal = Modal::default();
            ui.modal_history.clear();
        }
        UiMsg::GoBackModal => {
            let kind = ui.modal_history.pop().unwrap_or_default();
            ui.current_modal = Modal { kind, data: None };
        }
        UiMsg::SetThemeMode(theme) => ui.theme = theme,
        UiMsg::ToggleTheme => {
            ui.theme = match ui.theme {
                ThemeMode::System | ThemeMode::Dark => ThemeMode::Light,
                ThemeMode::Light => ThemeMode::Dark,
            };
        }
        UiMsg::SetScreenSize(size) => {
            ui.screen_size = size;
            // Mobile keeps whatever the user chose.
            if matches!(size, ScreenSize::Tablet | ScreenSize::Desktop) {
                ui.panels = PanelVisibility::default();
            }
        }
        UiMsg::SetOrientation(orientation) => ui.orientation = orientation,
        UiMsg::SetSafeAreaInsets(patch) => {
            let current = ui.safe_area_insets;
            ui.safe_area_insets = SafeAreaInsets {
                top: patch.top.unwrap_or(current.top),
                bottom: patch.bottom.unwrap_or(current.bottom),
                left: patch.left.unwrap_or(current.left),
                right: patch.right.unwrap_or(current.right),
            };
        }
        UiMsg::TogglePanel(panel) => {
            let visible = ui.panels.get(panel);
            ui.panels.set(panel, !visible);
        }
        UiMsg::SetPanelVisibility { panel, visible } => ui.panels.set(panel, visible),
        UiMsg::ResetPanelVisibility => ui.panels = PanelVisibility::default(),
        UiMsg::SetLoading {
            is_loading,
            message,
        } => {
            ui.is_loading = is_loading;
            ui.loading_message = message.unwrap_or_default();
        }
        UiMsg::AddToast(request) => {
            ui.push_toast(request);
        }
        UiMsg::RemoveToast(id) => ui.toasts.retain(|toast| toast.id != id),
        UiMsg::ClearToasts => ui.toasts.clear(),
        UiMsg::SetOnlineStatus(online) => ui.is_online = online,
        UiMsg::SetBackgroundStatus(background) => ui.is_background = background,
        UiMsg::SetKeyboardVisible { visible, height } => {
            ui.is_keyboard_visible = visible;
            ui.keyboard_height = height.unwrap_or(0);
        }
        UiMsg::SetReduceMotion(reduce) => ui.reduce_motion = reduce,
        UiMsg::SetHighContrast(high) => ui.high_contrast = high,
        UiMsg::SetTextScale(scale) => {
            ui.text_scale = scale.clamp(MIN_TEXT_SCALE, MAX_TEXT_SCALE);
        }
        UiMsg::Reset => {
            // Keep ids monotonic so pending expiry timers never hit a new toast.
            let next_toast_id = ui.next_toast_id;
            ui = UiState {
                next_toast_id,
                ..UiState::default()
            };
        }
    }
    ui
}
