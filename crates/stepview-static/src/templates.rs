//! Template engine for the shell pages.

use std::collections::BTreeMap;

use minijinja::Environment;
use serde::Serialize;

use crate::config::ViewerConfig;
use crate::manifest::StepRecord;

pub const LANDING: &str = "landing.html";
pub const ABOUT: &str = "about.html";
pub const STEP_WRAPPER: &str = "step.html";
pub const PLACEHOLDER_STEP: &str = "placeholder.html";
pub const MISSING_NOTES: &str = "missing-notes.html";
pub const MISSING_PROMPT: &str = "missing-prompt.html";

/// Context for rendering a page template.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    /// Page title
    pub title: String,
    /// Relative path from the page to the site root ("./", "../", ...)
    pub root: String,
    /// Locale of the interface text
    pub lang: String,
    /// Viewer configuration
    pub site: ViewerConfig,
    /// Interface text by message identifier
    pub text: BTreeMap<&'static str, String>,
    /// All steps, in manifest order
    pub steps: Vec<StepRecord>,
    /// Step the page belongs to
    pub current: Option<StepRecord>,
    /// Inline script configuring the client shell
    pub shell_script: String,
    /// Sentence summarizing the step count
    pub summary: String,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        for (name, source) in [
            ("base.html", BASE_TEMPLATE),
            (LANDING, LANDING_TEMPLATE),
            (ABOUT, ABOUT_TEMPLATE),
            (STEP_WRAPPER, STEP_TEMPLATE),
            (PLACEHOLDER_STEP, PLACEHOLDER_TEMPLATE),
            (MISSING_NOTES, MISSING_NOTES_TEMPLATE),
            (MISSING_PROMPT, MISSING_PROMPT_TEMPLATE),
        ] {
            env.add_template_owned(name.to_string(), source.to_string())
                .expect("built-in template must parse");
        }

        Self { env }
    }

    /// Render a page using the specified template.
    pub fn render(&self, template: &str, context: &PageContext) -> Result<String, minijinja::Error> {
        self.env.get_template(template)?.render(context)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="{{ lang }}">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{ title }}</title>
  {% if site.description %}<meta name="description" content="{{ site.description }}" />
  {% endif %}<link rel="stylesheet" href="{{ root|safe }}shell/shell.css" />
</head>
<body class="page-layout">
  <header class="page-header">
    <div class="page-header-inner">
      {% block back %}{% endblock %}
      <a href="{{ root|safe }}" class="page-brand">{{ site.siteTitle }}</a>
      <nav class="page-nav">
        <a href="{{ root|safe }}about/"{% block about_current %}{% endblock %}>{{ text.about }}</a>
      </nav>
    </div>
  </header>

  <main class="page-main{% block main_class %}{% endblock %}">
    {% block content %}{% endblock %}
  </main>

  <footer class="page-footer">
    {% if site.repoUrl %}<a href="{{ site.repoUrl }}" class="footer-link" target="_blank" rel="noopener">{{ text.view_source }}</a>{% endif %}
    {% if site.footerName %}<span class="footer-credit">{% if site.footerUrl %}<a href="{{ site.footerUrl }}" target="_blank" rel="noopener">{{ site.footerName }}</a>{% else %}{{ site.footerName }}{% endif %}</span>{% endif %}
  </footer>
</body>
</html>
"##;

const LANDING_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<section class="page-hero">
  <h1>{{ site.siteTitle }}</h1>
  {% if site.description %}<p>{{ site.description }}</p>{% endif %}
  <p>{{ summary }}{% if site.assistantName %} · {{ site.assistantName }}{% endif %}</p>
  {% if site.otherExperimentUrl %}<p><a href="{{ site.otherExperimentUrl }}">{{ site.otherExperimentUrl }}</a></p>{% endif %}
</section>

<section class="step-section">
  <h2 class="section-heading">{{ text.available_steps }}</h2>
  {% if steps %}
  <div class="step-grid">
    {% for step in steps %}
    <a href="{{ root|safe }}view/{{ step.id }}/" class="step-card">
      <span class="step-card-label">{{ step.label }}</span>
      {% if step.title != step.label %}<span class="step-card-title">{{ step.title }}</span>{% endif %}
      <svg class="step-card-arrow" viewBox="0 0 16 16" fill="none" aria-hidden="true">
        <path d="M3 8h10M9 4l4 4-4 4" stroke="currentColor" stroke-width="1.5" stroke-linecap="round" stroke-linejoin="round"/>
      </svg>
    </a>
    {% endfor %}
  </div>
  {% else %}
  <p class="step-empty">{{ text.no_steps }}</p>
  {% endif %}
</section>
{% endblock %}
"##;

const ABOUT_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block back %}<a href="{{ root|safe }}" class="page-back-link">{{ text.all_steps }}</a>{% endblock %}
{% block about_current %} aria-current="page"{% endblock %}
{% block main_class %} page-main--narrow{% endblock %}

{% block content %}
<h1>{{ title }}</h1>

<p>
  {{ site.siteTitle }} follows an application built one prompt at a time{% if site.assistantName %}
  by {{ site.assistantName }}{% endif %}. {{ summary }}
</p>

<h2>How steps are found</h2>
<p>
  Each step is a <code>step-NN</code> git tag. Every tag is checked out into a
  temporary worktree, its app is bundled with relative asset paths, and its
  Markdown docs are rendered to HTML. Without tags, <code>step-NN</code>
  folders or a <code>steps.json</code> list are used instead. The resulting
  <code>steps.json</code> at the site root drives the step selector.
</p>

<h2>Where the docs live</h2>
<ul>
  <li><strong>{{ text.agent_notes }}</strong>: <code>docs/agent-notes/NN.md</code></li>
  <li><strong>{{ text.prompt }}</strong>: <code>docs/prompts/step-NN.md</code> or <code>docs/prompts/NN.md</code></li>
</ul>

<h2>The shell</h2>
<p>
  Every step page is a thin static wrapper holding the step's app in an
  <code>&lt;iframe&gt;</code>, so step builds stay isolated from each other
  and from the shell.
</p>

{% if site.repoUrl %}
<h2>Source</h2>
<p><a href="{{ site.repoUrl }}" target="_blank" rel="noopener">{{ site.repoUrl }}</a></p>
{% endif %}
{% endblock %}
"##;

const STEP_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="{{ lang }}">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{ title }}</title>
  <link rel="stylesheet" href="{{ root|safe }}shell/shell.css" />
</head>
<body class="shell-layout" data-step="{{ current.id }}">

  <header class="shell-topbar" id="shell-topbar">
    <div class="shell-topbar-start">
      <a href="{{ root|safe }}" class="shell-home-btn" aria-label="{{ text.all_steps }}" title="{{ text.all_steps }}">
        <svg viewBox="0 0 20 20" fill="none" aria-hidden="true" width="18" height="18">
          <path d="M3 10l7-7 7 7" stroke="currentColor" stroke-width="1.6" stroke-linecap="round" stroke-linejoin="round"/>
          <path d="M5 8v9h4v-5h2v5h4V8" stroke="currentColor" stroke-width="1.6" stroke-linecap="round" stroke-linejoin="round"/>
        </svg>
      </a>
      <span class="shell-brand" aria-hidden="true">{{ site.siteTitle }}</span>
    </div>

    <div class="shell-topbar-center">
      <label class="shell-step-label" for="shell-step-select">{{ text.step }}</label>
      <select id="shell-step-select" class="shell-step-select" aria-label="{{ text.switch_step }}">
        {% for step in steps %}<option value="{{ step.id }}"{% if step.id == current.id %} selected{% endif %}>{{ step.label }}</option>
        {% endfor %}
      </select>
    </div>

    <div class="shell-topbar-end">
      <a href="{{ root|safe }}about/" class="shell-nav-link">{{ text.about }}</a>
      <button id="shell-copy-btn" class="shell-icon-btn" type="button" title="{{ text.copy_link }}" aria-label="{{ text.copy_link }}">
        <svg id="shell-copy-icon" viewBox="0 0 20 20" fill="none" aria-hidden="true" width="17" height="17">
          <rect x="7" y="7" width="10" height="12" rx="2" stroke="currentColor" stroke-width="1.6"/>
          <path d="M13 7V5a2 2 0 0 0-2-2H5a2 2 0 0 0-2 2v8a2 2 0 0 0 2 2h2" stroke="currentColor" stroke-width="1.6" stroke-linecap="round"/>
        </svg>
        <svg id="shell-copied-icon" viewBox="0 0 20 20" fill="none" aria-hidden="true" width="17" height="17" hidden>
          <path d="M4 10l4 4 8-8" stroke="currentColor" stroke-width="1.8" stroke-linecap="round" stroke-linejoin="round"/>
        </svg>
        <span id="shell-copy-label" class="shell-btn-label">{{ text.copy_link }}</span>
      </button>
      <button id="shell-sidebar-toggle" class="shell-icon-btn shell-hamburger-btn" type="button"
        aria-label="{{ text.toggle_sidebar }}" aria-expanded="false" aria-controls="shell-sidebar">
        <svg class="icon-menu" viewBox="0 0 20 20" fill="none" aria-hidden="true" width="18" height="18">
          <path d="M3 5h14M3 10h14M3 15h14" stroke="currentColor" stroke-width="1.6" stroke-linecap="round"/>
        </svg>
        <svg class="icon-close" viewBox="0 0 20 20" fill="none" aria-hidden="true" width="18" height="18" hidden>
          <path d="M5 5l10 10M15 5L5 15" stroke="currentColor" stroke-width="1.6" stroke-linecap="round"/>
        </svg>
      </button>
    </div>
  </header>

  <div class="shell-body">
    <main class="shell-main" aria-label="{{ current.label }}">
      <iframe id="shell-app-frame" src="{{ root|safe }}{{ current.id }}/" title="{{ current.label }}"
        class="shell-app-iframe" loading="eager"></iframe>
    </main>

    <aside class="shell-sidebar" id="shell-sidebar" aria-label="{{ text.agent_notes }} / {{ text.prompt }}">
      <div class="shell-sidebar-header">
        <div class="shell-tabs" role="tablist">
          <button class="shell-tab shell-tab--active" role="tab" type="button" aria-selected="true"
            data-tab="notes" id="tab-notes" aria-controls="panel-notes">{{ text.agent_notes }}</button>
          <button class="shell-tab" role="tab" type="button" aria-selected="false"
            data-tab="prompt" id="tab-prompt" aria-controls="panel-prompt">{{ text.prompt }}</button>
        </div>
        <button class="shell-sidebar-close" id="shell-sidebar-close" type="button" aria-label="{{ text.close_sidebar }}">
          <svg viewBox="0 0 16 16" fill="none" aria-hidden="true" width="16" height="16">
            <path d="M12 4L4 12M4 4l8 8" stroke="currentColor" stroke-width="1.6" stroke-linecap="round"/>
          </svg>
        </button>
      </div>

      <div class="shell-tab-panel shell-tab-panel--active" id="panel-notes" role="tabpanel" aria-labelledby="tab-notes">
        <div id="shell-notes-body" class="shell-prose-container">
          <p class="shell-loading">{{ text.loading_notes }}</p>
        </div>
      </div>

      <div class="shell-tab-panel" id="panel-prompt" role="tabpanel" aria-labelledby="tab-prompt" hidden>
        <div id="shell-prompt-body" class="shell-prose-container">
          <p class="shell-loading">{{ text.loading_prompt }}</p>
        </div>
      </div>
    </aside>

    <div class="shell-backdrop" id="shell-backdrop" aria-hidden="true"></div>
  </div>

  <script>
{{ shell_script | safe }}
  </script>
  <script src="{{ root|safe }}shell/shell.js"></script>
</body>
</html>
"##;

const PLACEHOLDER_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="{{ lang }}">
<head>
  <meta charset="UTF-8" />
  <title>{{ title }}</title>
</head>
<body>
  <h1>{{ title }}</h1>
  <p>{{ summary }}</p>
</body>
</html>
"##;

const MISSING_NOTES_TEMPLATE: &str = r##"<div class="prose prose-missing">
  <p>{{ text.notes_missing }}</p>
</div>
"##;

const MISSING_PROMPT_TEMPLATE: &str = r##"<div class="prose prose-missing">
  <p>{{ text.prompt_missing }}</p>
</div>
"##;
