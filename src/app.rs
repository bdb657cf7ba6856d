use std::path::PathBuf;

use eframe::egui;
use egui::{Align, Color32, Layout, RichText, TextureHandle, TextureOptions, Vec2};
use image::DynamicImage;

use crate::annotation::Annotation;
use crate::canvas::AnnotationCanvas;
use crate::export;
use crate::storage::{LocalStore, Prefs};

#[derive(Clone, Copy, Debug, PartialEq)]
enum Screen {
    Login,
    Signup,
    Annotator,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Tab {
    Upload,
    Save,
}

struct LoadedImage {
    raw: DynamicImage,
    texture: Option<TextureHandle>,
}

impl LoadedImage {
    fn size_vec2(&self) -> Vec2 {
        Vec2::new(self.raw.width() as f32, self.raw.height() as f32)
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        if self.texture.is_some() {
            return;
        }
        let rgba = self.raw.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let pixels = rgba.as_flat_samples();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
        self.texture = Some(ctx.load_texture("image", color_image, TextureOptions::LINEAR));
    }
}

pub struct PinmarkApp {
    local: Option<LocalStore>,
    screen: Screen,
    email: String,
    password: String,
    flash: Option<String>,

    dark_mode: bool,
    tab: Tab,
    image: Option<LoadedImage>,
    canvas: AnnotationCanvas,
    /// Size the image was last displayed at; export scales annotation
    /// positions from this back up to native resolution.
    last_display: Option<Vec2>,
}

impl PinmarkApp {
    pub fn new(cc: &eframe::CreationContext<'_>, initial_image: Option<PathBuf>) -> Self {
        let local = match LocalStore::open() {
            Ok(local) => Some(local),
            Err(err) => {
                eprintln!("Local storage unavailable: {err:#}");
                None
            }
        };

        let prefs = local.as_ref().map(|l| l.load_prefs()).unwrap_or_default();
        apply_visuals(&cc.egui_ctx, prefs.dark_mode);

        // First run has no credential record; start on the signup screen.
        let screen = if local.as_ref().and_then(|l| l.load_user()).is_some() {
            Screen::Login
        } else {
            Screen::Signup
        };

        let image = initial_image.and_then(|path| match image::open(&path) {
            Ok(raw) => Some(LoadedImage { raw, texture: None }),
            Err(err) => {
                eprintln!("Cannot open {}: {err}", path.display());
                None
            }
        });

        Self {
            local,
            screen,
            email: String::new(),
            password: String::new(),
            flash: None,
            dark_mode: prefs.dark_mode,
            tab: Tab::Upload,
            image,
            canvas: AnnotationCanvas::new(),
            last_display: None,
        }
    }

    fn login_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(140.0);
                ui.heading("Login");
                ui.add_space(8.0);
                if let Some(msg) = &self.flash {
                    ui.label(RichText::new(msg).color(Color32::from_rgb(96, 165, 250)));
                    ui.add_space(4.0);
                }
                ui.add(egui::TextEdit::singleline(&mut self.email).hint_text("Email"));
                ui.add(
                    egui::TextEdit::singleline(&mut self.password)
                        .password(true)
                        .hint_text("Password"),
                );
                ui.add_space(8.0);

                let submit =
                    ui.button("Login").clicked() || ui.input(|i| i.key_pressed(egui::Key::Enter));
                if submit && !self.email.is_empty() && !self.password.is_empty() {
                    let ok = self
                        .local
                        .as_ref()
                        .is_some_and(|l| l.login(&self.email, &self.password));
                    if ok {
                        self.flash = None;
                        self.password.clear();
                        self.screen = Screen::Annotator;
                    } else {
                        self.flash =
                            Some("Invalid credentials. Please sign up first.".to_owned());
                        self.password.clear();
                        self.screen = Screen::Signup;
                    }
                }

                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    ui.label("Don't have an account?");
                    if ui.link("Sign Up").clicked() {
                        self.flash = None;
                        self.screen = Screen::Signup;
                    }
                });
            });
        });
    }

    fn signup_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(140.0);
                ui.heading("Sign Up");
                ui.add_space(8.0);
                if let Some(msg) = &self.flash {
                    ui.label(RichText::new(msg).color(Color32::from_rgb(248, 113, 113)));
                    ui.add_space(4.0);
                }
                ui.add(egui::TextEdit::singleline(&mut self.email).hint_text("Email"));
                ui.add(
                    egui::TextEdit::singleline(&mut self.password)
                        .password(true)
                        .hint_text("Password"),
                );
                ui.add_space(8.0);

                let submit = ui.button("Sign Up").clicked()
                    || ui.input(|i| i.key_pressed(egui::Key::Enter));
                if submit && !self.email.is_empty() && !self.password.is_empty() {
                    match &self.local {
                        Some(local) => match local.signup(&self.email, &self.password) {
                            Ok(()) => {
                                self.flash =
                                    Some("Signup successful! Please login.".to_owned());
                                self.password.clear();
                                self.screen = Screen::Login;
                            }
                            Err(err) => {
                                self.flash = Some(format!("Signup failed: {err:#}"));
                            }
                        },
                        None => {
                            self.flash =
                                Some("Signup failed: local storage unavailable.".to_owned());
                        }
                    }
                }

                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    ui.label("Already have an account?");
                    if ui.link("Login").clicked() {
                        self.flash = None;
                        self.screen = Screen::Login;
                    }
                });
            });
        });
    }

    fn annotator_screen(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Logout").clicked() {
                    self.logout();
                    return;
                }
                ui.separator();
                ui.selectable_value(&mut self.tab, Tab::Upload, "Upload Image");
                ui.selectable_value(&mut self.tab, Tab::Save, "Save Image");
                ui.separator();
                match self.tab {
                    Tab::Upload => {
                        if ui.button("Select Image").clicked() {
                            self.pick_image();
                        }
                    }
                    Tab::Save => {
                        let enabled = self.image.is_some();
                        if ui
                            .add_enabled(enabled, egui::Button::new("Save Annotated Image"))
                            .clicked()
                        {
                            self.export_annotated();
                        }
                    }
                }
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.checkbox(&mut self.dark_mode, "Dark mode").changed() {
                        apply_visuals(ctx, self.dark_mode);
                        if let Some(local) = &self.local {
                            if let Err(err) = local.save_prefs(Prefs {
                                dark_mode: self.dark_mode,
                            }) {
                                eprintln!("Cannot save preferences: {err:#}");
                            }
                        }
                    }
                });
            });
        });

        if let Some(image) = &mut self.image {
            image.ensure_texture(ctx);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(4.0);
                ui.heading("Image Annotation Tool");
                ui.add_space(8.0);
                match &self.image {
                    Some(img) => {
                        if let Some(tex) = &img.texture {
                            let rect = self.canvas.show(ui, tex, img.size_vec2());
                            self.last_display = Some(rect.size());
                        }
                    }
                    None => {
                        ui.add_space(40.0);
                        ui.label("Upload an image, then click anywhere on it to add a marker.");
                    }
                }
            });
        });
    }

    fn pick_image(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "bmp", "webp"])
            .pick_file()
        else {
            return;
        };
        match image::open(&path) {
            Ok(raw) => {
                // Annotations belong to the image they were placed on;
                // they do not carry over to the next one.
                self.image = Some(LoadedImage { raw, texture: None });
                self.canvas.clear();
                self.last_display = None;
            }
            Err(err) => eprintln!("Cannot open {}: {err}", path.display()),
        }
    }

    fn export_annotated(&mut self) {
        let (Some(img), Some(display)) = (self.image.as_ref(), self.last_display) else {
            return;
        };
        let annotations: Vec<Annotation> = self.canvas.store.iter().cloned().collect();
        let flat = match export::flatten(&img.raw, &annotations, display) {
            Ok(flat) => flat,
            Err(err) => {
                eprintln!("Export failed: {err:#}");
                return;
            }
        };
        let Some(path) = rfd::FileDialog::new()
            .set_file_name("annotated-image.png")
            .save_file()
        else {
            return;
        };
        match export::save_png(&flat, &path) {
            Ok(()) => eprintln!("Exported to {}", path.display()),
            Err(err) => eprintln!("Export failed: {err:#}"),
        }
    }

    fn logout(&mut self) {
        self.screen = Screen::Login;
        self.flash = None;
        self.email.clear();
        self.password.clear();
        self.image = None;
        self.canvas.clear();
        self.last_display = None;
    }
}

fn apply_visuals(ctx: &egui::Context, dark_mode: bool) {
    ctx.set_visuals(if dark_mode {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    });
}

impl eframe::App for PinmarkApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        match self.screen {
            Screen::Login => self.login_screen(ctx),
            Screen::Signup => self.signup_screen(ctx),
            Screen::Annotator => self.annotator_screen(ctx),
        }
    }
}
