use crate::sensor::Humidity;

/// Something which can show the humidity reading
pub trait Display {
    /// Show a humidity reading
    fn show_humidity(&mut self, humidity: Humidity);

    /// Show that the last sample failed
    fn show_error(&mut self);
}
