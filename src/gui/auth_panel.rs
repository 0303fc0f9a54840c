//! Teller One
//! Login and registration against the local vault.

use crate::gui::{ACCENT, MUTED, PRIMARY};
use crate::vault::{
    generate_vault_key, is_valid_pin, sanitize_pin, sanitize_vault_key, VaultEntry, VaultStorage,
    VAULT_KEY_LEN,
};
use egui::{Color32, RichText, TextEdit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum AuthMode {
    #[default]
    Login,
    Register,
}

/// Actions triggered by the auth panel
#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    None,
    Authenticated(String),
}

#[derive(Default)]
pub struct AuthPanel {
    mode: AuthMode,
    /// `None` until the institution question is answered.
    is_institution: Option<bool>,
    show_key: bool,

    login_user: String,
    login_key: String,

    reg_user: String,
    reg_email: String,
    reg_institution: String,
    reg_pin: String,

    generated_key: Option<String>,
    alert: Option<String>,
}

impl AuthPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear every field, e.g. after logout.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn switch_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
        self.generated_key = None;
        self.is_institution = None;
        self.alert = None;
    }

    fn login(&mut self, vault: &VaultStorage) -> AuthAction {
        match vault.validate_login(&self.login_user, &self.login_key) {
            Ok(entry) => {
                self.alert = None;
                AuthAction::Authenticated(entry.username)
            }
            Err(e) => {
                self.alert = Some(e.to_string());
                AuthAction::None
            }
        }
    }

    fn register(&mut self, vault: &VaultStorage) {
        let key = generate_vault_key();
        let institution = if self.is_institution == Some(true) {
            Some(self.reg_institution.trim().to_string())
        } else {
            None
        };
        let entry = VaultEntry::new(
            self.reg_user.trim(),
            key.clone(),
            self.reg_email.trim(),
            institution,
            self.reg_pin.clone(),
        );
        match vault.register_user(entry) {
            Ok(()) => {
                self.generated_key = Some(key);
                self.alert = None;
            }
            Err(e) => self.alert = Some(e.to_string()),
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, vault: &VaultStorage) -> AuthAction {
        let mut action = AuthAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.label(RichText::new("TELLER ONE").size(24.0).strong().color(PRIMARY));
            ui.label(RichText::new("AUTHENTICATION CORE").size(11.0).color(MUTED));
            ui.add_space(16.0);

            if let Some(alert) = &self.alert {
                ui.label(RichText::new(format!("⚠ {}", alert)).size(12.0).color(ACCENT));
                ui.add_space(8.0);
            }

            ui.horizontal(|ui| {
                ui.add_space((ui.available_width() - 180.0).max(0.0) / 2.0);
                for (mode, label) in [(AuthMode::Login, "Login"), (AuthMode::Register, "Register")] {
                    if ui.selectable_label(self.mode == mode, label).clicked() && self.mode != mode {
                        self.switch_mode(mode);
                    }
                }
            });
            ui.add_space(12.0);

            egui::Frame::none()
                .fill(ui.visuals().widgets.noninteractive.bg_fill)
                .rounding(8.0)
                .inner_margin(16.0)
                .show(ui, |ui| {
                    ui.set_max_width(340.0);
                    match (self.mode, self.generated_key.is_some()) {
                        (AuthMode::Login, _) => action = self.show_login(ui, vault),
                        (AuthMode::Register, false) => self.show_register(ui, vault),
                        (AuthMode::Register, true) => action = self.show_generated_key(ui),
                    }
                });
        });

        action
    }

    fn show_login(&mut self, ui: &mut egui::Ui, vault: &VaultStorage) -> AuthAction {
        ui.label("Username");
        ui.add(TextEdit::singleline(&mut self.login_user).hint_text("Enter username"));
        ui.add_space(6.0);

        ui.label(format!("Vault Key ({}-digit PIN)", VAULT_KEY_LEN));
        ui.horizontal(|ui| {
            let key = ui.add(
                TextEdit::singleline(&mut self.login_key)
                    .password(!self.show_key)
                    .hint_text("••••••")
                    .desired_width(200.0),
            );
            if key.changed() {
                self.login_key = sanitize_vault_key(&self.login_key);
            }
            let toggle = if self.show_key { "Hide" } else { "Show" };
            if ui.small_button(toggle).clicked() {
                self.show_key = !self.show_key;
            }
        });
        ui.add_space(10.0);

        let ready = !self.login_user.trim().is_empty() && self.login_key.len() == VAULT_KEY_LEN;
        let mut action = AuthAction::None;
        ui.add_enabled_ui(ready, |ui| {
            let button = egui::Button::new(RichText::new("Access Vault →").size(14.0))
                .min_size(egui::vec2(200.0, 30.0));
            if ui.add(button).clicked() {
                action = self.login(vault);
            }
        });
        action
    }

    fn show_register(&mut self, ui: &mut egui::Ui, vault: &VaultStorage) {
        let Some(is_institution) = self.is_institution else {
            ui.label(RichText::new("Are you working under an institution?").size(13.0));
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("🏛 Yes, Institution").clicked() {
                    self.is_institution = Some(true);
                }
                if ui.button("👤 No, Individual").clicked() {
                    self.is_institution = Some(false);
                }
            });
            return;
        };

        ui.label("Username");
        ui.add(TextEdit::singleline(&mut self.reg_user).hint_text("Choose a username"));
        ui.add_space(6.0);

        if is_institution {
            ui.label("Institution Name");
            ui.add(TextEdit::singleline(&mut self.reg_institution).hint_text("Institution name"));
            ui.add_space(6.0);
        }

        ui.label("Email");
        ui.add(TextEdit::singleline(&mut self.reg_email).hint_text("email@example.com"));
        ui.add_space(6.0);

        ui.label("Recovery PIN");
        if ui
            .add(TextEdit::singleline(&mut self.reg_pin).hint_text("4-digit PIN"))
            .changed()
        {
            self.reg_pin = sanitize_pin(&self.reg_pin);
        }
        ui.add_space(10.0);

        let ready = !self.reg_user.trim().is_empty()
            && !self.reg_email.trim().is_empty()
            && is_valid_pin(&self.reg_pin);
        ui.add_enabled_ui(ready, |ui| {
            let button = egui::Button::new(RichText::new("Generate Vault Key").size(14.0))
                .min_size(egui::vec2(200.0, 30.0));
            if ui.add(button).clicked() {
                self.register(vault);
            }
        });
    }

    fn show_generated_key(&mut self, ui: &mut egui::Ui) -> AuthAction {
        let key = self.generated_key.clone().unwrap_or_default();
        ui.vertical_centered(|ui| {
            ui.label(RichText::new("Your Vault Key").size(13.0).color(MUTED));
            ui.label(
                RichText::new(key)
                    .size(32.0)
                    .monospace()
                    .strong()
                    .color(PRIMARY),
            );
            ui.add_space(6.0);
            ui.label(
                RichText::new("⚠ Store this key securely. It cannot be regenerated.")
                    .size(11.0)
                    .color(Color32::from_rgb(243, 156, 18)),
            );
            ui.add_space(10.0);
        });

        if ui.button("Enter the Vault →").clicked() {
            return AuthAction::Authenticated(self.reg_user.trim().to_string());
        }
        AuthAction::None
    }
}
