//! Add-host form overlay.

use laglens_core::{Host, HostError};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;

/// Field labels in tab order.
pub const FIELDS: [&str; 5] = ["Name", "Address", "Latitude", "Longitude", "City"];

/// Text entry state for a new host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostForm {
    pub values: [String; 5],
    pub focused: usize,
}

impl HostForm {
    pub fn set_values(&mut self, values: [&str; 5]) {
        self.values = values.map(str::to_string);
    }

    pub fn focus_next(&mut self) {
        self.focused = (self.focused + 1) % FIELDS.len();
    }

    pub fn focus_prev(&mut self) {
        self.focused = (self.focused + FIELDS.len() - 1) % FIELDS.len();
    }

    pub fn push(&mut self, c: char) {
        self.values[self.focused].push(c);
    }

    pub fn pop(&mut self) {
        self.values[self.focused].pop();
    }

    /// Parse the fields into a host. Range checks happen in the registry.
    pub fn to_host(&self) -> Result<Host, String> {
        let [name, address, latitude, longitude, city] = &self.values;

        let required: [(&'static str, &String); 4] = [
            ("name", name),
            ("address", address),
            ("latitude", latitude),
            ("longitude", longitude),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(HostError::MissingField(field).to_string());
            }
        }

        let latitude: f64 = latitude
            .trim()
            .parse()
            .map_err(|_| format!("Latitude must be a number (got '{}')", latitude.trim()))?;
        let longitude: f64 = longitude
            .trim()
            .parse()
            .map_err(|_| format!("Longitude must be a number (got '{}')", longitude.trim()))?;

        let host = Host::new(name.trim(), address.trim(), latitude, longitude);
        Ok(if city.trim().is_empty() {
            host
        } else {
            host.with_city(city.trim())
        })
    }
}

/// Render the form as a centered modal.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(form) = app.form.as_ref() else {
        return;
    };

    let mut lines = vec![Line::from("")];
    for (i, label) in FIELDS.iter().enumerate() {
        let focused = i == form.focused;
        let label_style = if focused {
            Style::default()
                .fg(app.theme.highlight)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let cursor = if focused { "_" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!(" {:<10} ", label), label_style),
            Span::raw(format!("{}{}", form.values[i], cursor)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![Span::styled(
        " Tab:next field  Enter:add  Esc:cancel",
        Style::default().add_modifier(Modifier::DIM),
    )]));

    let block = Block::default()
        .title(" Add Host ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let width = 50u16.min(area.width.saturating_sub(4));
    let height = 11u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let form_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, form_area);
    frame.render_widget(Paragraph::new(lines).block(block), form_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fields_into_host() {
        let mut form = HostForm::default();
        form.set_values([" edge ", "203.0.113.7", "50.1", "-8.7", "Frankfurt"]);
        let host = form.to_host().unwrap();
        assert_eq!(host.name, "edge");
        assert_eq!(host.latitude, 50.1);
        assert_eq!(host.longitude, -8.7);
        assert_eq!(host.city, "Frankfurt");
    }

    #[test]
    fn blank_city_uses_default() {
        let mut form = HostForm::default();
        form.set_values(["edge", "203.0.113.7", "0", "0", "  "]);
        assert_eq!(form.to_host().unwrap().city, laglens_core::host::UNKNOWN_CITY);
    }

    #[test]
    fn non_numeric_coordinates_are_rejected() {
        let mut form = HostForm::default();
        form.set_values(["edge", "203.0.113.7", "north", "0", ""]);
        assert!(form.to_host().unwrap_err().contains("Latitude"));
    }

    #[test]
    fn missing_fields_reported_before_coordinates() {
        let mut form = HostForm::default();
        form.set_values(["", "203.0.113.7", "", "", ""]);
        assert_eq!(form.to_host().unwrap_err(), "Missing required field: name");

        form.set_values(["edge", " ", "", "0", ""]);
        assert_eq!(form.to_host().unwrap_err(), "Missing required field: address");

        form.set_values(["edge", "203.0.113.7", "", "0", ""]);
        assert_eq!(form.to_host().unwrap_err(), "Missing required field: latitude");
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = HostForm::default();
        form.focus_prev();
        assert_eq!(form.focused, 4);
        form.focus_next();
        assert_eq!(form.focused, 0);
        form.push('a');
        form.push('b');
        form.pop();
        assert_eq!(form.values[0], "a");
    }
}
