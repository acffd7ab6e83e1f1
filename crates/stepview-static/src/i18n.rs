//! Interface text for the viewer shell.
//!
//! Messages are keyed by [`MessageKey`] rather than dotted strings. Every
//! catalog is checked against the full key set when it is loaded, so a missing
//! translation fails the build instead of showing a raw key in the browser.

use std::collections::{BTreeMap, HashMap};

use MessageKey::*;

/// Locale used when the configured one is unknown.
pub const DEFAULT_LOCALE: &str = "en";

/// Every piece of text the shell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageKey {
    AllSteps,
    About,
    AvailableSteps,
    StepCount,
    Step,
    SwitchStep,
    CopyLink,
    Copied,
    ToggleSidebar,
    CloseSidebar,
    AgentNotes,
    Prompt,
    LoadingNotes,
    LoadingPrompt,
    LoadFailed,
    ViewSource,
    NoSteps,
    NotesMissing,
    PromptMissing,
    NoApp,
    MockStep,
}

impl MessageKey {
    /// The canonical key set.
    pub const ALL: &'static [MessageKey] = &[
        Self::AllSteps,
        Self::About,
        Self::AvailableSteps,
        Self::StepCount,
        Self::Step,
        Self::SwitchStep,
        Self::CopyLink,
        Self::Copied,
        Self::ToggleSidebar,
        Self::CloseSidebar,
        Self::AgentNotes,
        Self::Prompt,
        Self::LoadingNotes,
        Self::LoadingPrompt,
        Self::LoadFailed,
        Self::ViewSource,
        Self::NoSteps,
        Self::NotesMissing,
        Self::PromptMissing,
        Self::NoApp,
        Self::MockStep,
    ];

    /// Identifier used in templates and in the client script.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllSteps => "all_steps",
            Self::About => "about",
            Self::AvailableSteps => "available_steps",
            Self::StepCount => "step_count",
            Self::Step => "step",
            Self::SwitchStep => "switch_step",
            Self::CopyLink => "copy_link",
            Self::Copied => "copied",
            Self::ToggleSidebar => "toggle_sidebar",
            Self::CloseSidebar => "close_sidebar",
            Self::AgentNotes => "agent_notes",
            Self::Prompt => "prompt",
            Self::LoadingNotes => "loading_notes",
            Self::LoadingPrompt => "loading_prompt",
            Self::LoadFailed => "load_failed",
            Self::ViewSource => "view_source",
            Self::NoSteps => "no_steps",
            Self::NotesMissing => "notes_missing",
            Self::PromptMissing => "prompt_missing",
            Self::NoApp => "no_app",
            Self::MockStep => "mock_step",
        }
    }
}

/// Errors raised while loading a catalog.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum I18nError {
    #[error("Catalog '{locale}' is missing translations for: {}", .missing.join(", "))]
    MissingKeys {
        locale: String,
        missing: Vec<&'static str>,
    },
}

/// A validated set of messages for one locale.
#[derive(Debug, Clone)]
pub struct Catalog {
    locale: String,
    messages: HashMap<MessageKey, String>,
}

impl Catalog {
    /// Build a catalog, checking it covers every [`MessageKey`].
    pub fn from_entries(
        locale: &str,
        entries: &[(MessageKey, &str)],
    ) -> Result<Self, I18nError> {
        let messages: HashMap<MessageKey, String> = entries
            .iter()
            .map(|(key, text)| (*key, text.to_string()))
            .collect();

        let missing: Vec<&'static str> = MessageKey::ALL
            .iter()
            .filter(|key| !messages.contains_key(*key))
            .map(|key| key.as_str())
            .collect();

        if !missing.is_empty() {
            return Err(I18nError::MissingKeys {
                locale: locale.to_string(),
                missing,
            });
        }

        Ok(Self {
            locale: locale.to_string(),
            messages,
        })
    }

    /// Load a built-in catalog, falling back to English for unknown locales.
    pub fn load(locale: &str) -> Result<Self, I18nError> {
        let code = locale.trim().to_lowercase();
        match builtin(&code) {
            Some(entries) => Self::from_entries(&code, entries),
            None => {
                tracing::warn!(
                    "Unknown locale '{}', using '{}'",
                    locale,
                    DEFAULT_LOCALE
                );
                Self::from_entries(DEFAULT_LOCALE, EN)
            }
        }
    }

    /// Locale code of this catalog.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Message template for `key`.
    pub fn get(&self, key: MessageKey) -> &str {
        // Present by construction
        self.messages.get(&key).map(String::as_str).unwrap_or_default()
    }

    /// Message with `{name}` placeholders replaced.
    pub fn format(&self, key: MessageKey, params: &[(&str, &str)]) -> String {
        let mut text = self.get(key).to_string();
        for (name, value) in params {
            text = text.replace(&format!("{{{}}}", name), value);
        }
        text
    }

    /// All messages keyed by their template identifier.
    pub fn to_map(&self) -> BTreeMap<&'static str, String> {
        MessageKey::ALL
            .iter()
            .map(|key| (key.as_str(), self.get(*key).to_string()))
            .collect()
    }
}

/// Locales with a built-in catalog.
pub const SUPPORTED_LOCALES: &[&str] = &["en", "fr", "es"];

fn builtin(locale: &str) -> Option<&'static [(MessageKey, &'static str)]> {
    match locale {
        "en" => Some(EN),
        "fr" => Some(FR),
        "es" => Some(ES),
        _ => None,
    }
}

const EN: &[(MessageKey, &str)] = &[
    (AllSteps, "All steps"),
    (About, "About"),
    (AvailableSteps, "Available steps"),
    (StepCount, "{count} steps"),
    (Step, "Step"),
    (SwitchStep, "Switch step"),
    (CopyLink, "Copy link"),
    (Copied, "Copied!"),
    (ToggleSidebar, "Toggle sidebar"),
    (CloseSidebar, "Close sidebar"),
    (AgentNotes, "Agent notes"),
    (Prompt, "Prompt"),
    (LoadingNotes, "Loading notes…"),
    (LoadingPrompt, "Loading prompt…"),
    (LoadFailed, "Could not load content ({error})."),
    (ViewSource, "View source"),
    (NoSteps, "No steps have been built yet."),
    (NotesMissing, "No agent notes were written for this step."),
    (PromptMissing, "No prompt was recorded for this step."),
    (NoApp, "This step has no app build. Its notes and prompt are in the sidebar."),
    (MockStep, "Mock step artifact. In standalone mode the viewer is tested with placeholder content."),
];

const FR: &[(MessageKey, &str)] = &[
    (AllSteps, "Toutes les étapes"),
    (About, "À propos"),
    (AvailableSteps, "Étapes disponibles"),
    (StepCount, "{count} étapes"),
    (Step, "Étape"),
    (SwitchStep, "Changer d'étape"),
    (CopyLink, "Copier le lien"),
    (Copied, "Copié !"),
    (ToggleSidebar, "Afficher le panneau"),
    (CloseSidebar, "Fermer le panneau"),
    (AgentNotes, "Notes de l'agent"),
    (Prompt, "Prompt"),
    (LoadingNotes, "Chargement des notes…"),
    (LoadingPrompt, "Chargement du prompt…"),
    (LoadFailed, "Impossible de charger le contenu ({error})."),
    (ViewSource, "Voir le code source"),
    (NoSteps, "Aucune étape n'a encore été construite."),
    (NotesMissing, "Aucune note d'agent pour cette étape."),
    (PromptMissing, "Aucun prompt enregistré pour cette étape."),
    (NoApp, "Cette étape n'a pas d'application construite. Ses notes et son prompt sont dans le panneau."),
    (MockStep, "Étape fictive. En mode autonome, la visionneuse est testée avec du contenu de remplacement."),
];

const ES: &[(MessageKey, &str)] = &[
    (AllSteps, "Todos los pasos"),
    (About, "Acerca de"),
    (AvailableSteps, "Pasos disponibles"),
    (StepCount, "{count} pasos"),
    (Step, "Paso"),
    (SwitchStep, "Cambiar de paso"),
    (CopyLink, "Copiar enlace"),
    (Copied, "¡Copiado!"),
    (ToggleSidebar, "Mostrar panel"),
    (CloseSidebar, "Cerrar panel"),
    (AgentNotes, "Notas del agente"),
    (Prompt, "Prompt"),
    (LoadingNotes, "Cargando notas…"),
    (LoadingPrompt, "Cargando prompt…"),
    (LoadFailed, "No se pudo cargar el contenido ({error})."),
    (ViewSource, "Ver el código fuente"),
    (NoSteps, "Todavía no se ha construido ningún paso."),
    (NotesMissing, "No hay notas del agente para este paso."),
    (PromptMissing, "No se registró ningún prompt para este paso."),
    (NoApp, "Este paso no tiene una aplicación construida. Sus notas y su prompt están en el panel."),
    (MockStep, "Paso de prueba. En modo autónomo el visor se prueba con contenido de ejemplo."),
];
