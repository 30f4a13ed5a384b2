use orbit::touch::TouchSample;

#[derive(Debug, Clone)]
pub enum AppEvent {
    Touch(TouchSample),
    Frame,
    ConfigReload,
}
