//! Shell stylesheet and client script.

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Generate the shell stylesheet.
    pub fn generate_css() -> String {
        SHELL_CSS.to_string()
    }

    /// Generate the shell script.
    pub fn generate_js() -> String {
        SHELL_JS.to_string()
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }

    /// Shell stylesheet, minified when requested. Falls back to the
    /// unminified source if lightningcss rejects it.
    pub fn shell_css(minify: bool) -> String {
        let css = Self::generate_css();
        if !minify {
            return css;
        }
        match Self::minify_css(&css) {
            Ok(min) => min,
            Err(e) => {
                tracing::warn!("{}; writing unminified shell.css", e);
                css
            }
        }
    }
}

const SHELL_CSS: &str = r#"/* Step viewer shell */

:root {
  --background: #0f1115;
  --surface: #171a21;
  --muted: #1f232c;
  --border: #2b303b;
  --foreground: #e6e8ee;
  --muted-foreground: #9aa3b2;
  --primary: #7aa2ff;
  --primary-foreground: #0f1115;
  --success: #4ade80;
  --radius: 0.5rem;
  --topbar-height: 52px;
  --sidebar-width: 380px;
  --content-max-width: 880px;
}

* {
  box-sizing: border-box;
  margin: 0;
  padding: 0;
}

html,
body {
  height: 100%;
}

body {
  font-family: system-ui, -apple-system, "Segoe UI", sans-serif;
  background: var(--background);
  color: var(--foreground);
  line-height: 1.6;
}

a {
  color: var(--primary);
}

/* Landing and about pages */
.page-layout {
  display: flex;
  flex-direction: column;
  min-height: 100vh;
}

.page-header {
  border-bottom: 1px solid var(--border);
  background: var(--surface);
}

.page-header-inner {
  display: flex;
  align-items: center;
  gap: 1rem;
  max-width: var(--content-max-width);
  margin: 0 auto;
  padding: 0.75rem 1.5rem;
}

.page-brand {
  font-weight: 700;
  color: var(--foreground);
  text-decoration: none;
}

.page-back-link {
  color: var(--muted-foreground);
  text-decoration: none;
  font-size: 0.875rem;
}

.page-nav {
  margin-left: auto;
}

.page-nav a {
  color: var(--muted-foreground);
  text-decoration: none;
}

.page-nav a[aria-current="page"] {
  color: var(--foreground);
}

.page-main {
  flex: 1;
  width: 100%;
  max-width: var(--content-max-width);
  margin: 0 auto;
  padding: 2rem 1.5rem;
}

.page-main--narrow {
  max-width: 720px;
}

.page-main h1 {
  font-size: 2rem;
  margin-bottom: 1rem;
}

.page-main h2 {
  font-size: 1.25rem;
  margin: 2rem 0 0.75rem;
}

.page-main p,
.page-main ul {
  margin-bottom: 1rem;
}

.page-main ul {
  padding-left: 1.25rem;
}

.page-hero {
  margin-bottom: 2rem;
}

.page-hero p {
  color: var(--muted-foreground);
}

.section-heading {
  font-size: 0.75rem;
  text-transform: uppercase;
  letter-spacing: 0.05em;
  color: var(--muted-foreground);
}

.step-grid {
  display: grid;
  grid-template-columns: repeat(auto-fill, minmax(220px, 1fr));
  gap: 0.75rem;
}

.step-card {
  display: flex;
  flex-direction: column;
  gap: 0.25rem;
  position: relative;
  padding: 1rem 2.5rem 1rem 1rem;
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  color: var(--foreground);
  text-decoration: none;
  transition: border-color 0.15s;
}

.step-card:hover {
  border-color: var(--primary);
}

.step-card-label {
  font-weight: 600;
}

.step-card-title {
  font-size: 0.875rem;
  color: var(--muted-foreground);
}

.step-card-arrow {
  position: absolute;
  right: 1rem;
  top: 50%;
  width: 16px;
  height: 16px;
  transform: translateY(-50%);
  color: var(--muted-foreground);
}

.step-empty {
  color: var(--muted-foreground);
}

.page-footer {
  display: flex;
  justify-content: center;
  gap: 1.5rem;
  padding: 1.5rem;
  border-top: 1px solid var(--border);
  font-size: 0.875rem;
  color: var(--muted-foreground);
}

.page-footer a {
  color: var(--muted-foreground);
}

/* Step wrapper pages */
.shell-layout {
  display: flex;
  flex-direction: column;
  height: 100vh;
  overflow: hidden;
}

.shell-topbar {
  display: flex;
  align-items: center;
  justify-content: space-between;
  gap: 0.75rem;
  height: var(--topbar-height);
  padding: 0 0.75rem;
  background: var(--surface);
  border-bottom: 1px solid var(--border);
  flex-shrink: 0;
}

.shell-topbar-start,
.shell-topbar-center,
.shell-topbar-end {
  display: flex;
  align-items: center;
  gap: 0.5rem;
  min-width: 0;
}

.shell-brand {
  font-weight: 600;
  white-space: nowrap;
  overflow: hidden;
  text-overflow: ellipsis;
}

.shell-step-label {
  font-size: 0.8125rem;
  color: var(--muted-foreground);
}

.shell-step-select {
  max-width: 320px;
  padding: 0.3rem 0.5rem;
  background: var(--muted);
  color: var(--foreground);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  font: inherit;
}

.shell-nav-link {
  color: var(--muted-foreground);
  text-decoration: none;
  font-size: 0.875rem;
}

.shell-home-btn,
.shell-icon-btn {
  display: inline-flex;
  align-items: center;
  gap: 0.375rem;
  padding: 0.375rem 0.5rem;
  background: none;
  color: var(--muted-foreground);
  border: 1px solid transparent;
  border-radius: var(--radius);
  cursor: pointer;
  font: inherit;
  font-size: 0.8125rem;
  text-decoration: none;
}

.shell-home-btn:hover,
.shell-icon-btn:hover {
  color: var(--foreground);
  border-color: var(--border);
}

.shell-icon-btn.copied {
  color: var(--success);
}

.shell-icon-btn:focus-visible,
.shell-tab:focus-visible,
.shell-step-select:focus-visible {
  outline: 2px solid var(--primary);
  outline-offset: 2px;
}

.shell-hamburger-btn {
  display: none;
}

.shell-body {
  display: flex;
  flex: 1;
  min-height: 0;
  position: relative;
}

.shell-main {
  flex: 1;
  min-width: 0;
  background: #fff;
}

.shell-app-iframe {
  width: 100%;
  height: 100%;
  border: 0;
  display: block;
}

.shell-sidebar {
  display: flex;
  flex-direction: column;
  width: var(--sidebar-width);
  flex-shrink: 0;
  background: var(--surface);
  border-left: 1px solid var(--border);
}

.shell-sidebar-header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  border-bottom: 1px solid var(--border);
  padding: 0 0.5rem;
}

.shell-tabs {
  display: flex;
}

.shell-tab {
  padding: 0.75rem 0.75rem;
  background: none;
  border: 0;
  border-bottom: 2px solid transparent;
  color: var(--muted-foreground);
  cursor: pointer;
  font: inherit;
  font-size: 0.875rem;
}

.shell-tab--active {
  color: var(--foreground);
  border-bottom-color: var(--primary);
}

.shell-sidebar-close {
  display: none;
  background: none;
  border: 0;
  color: var(--muted-foreground);
  cursor: pointer;
  padding: 0.5rem;
}

.shell-tab-panel {
  flex: 1;
  overflow-y: auto;
  padding: 1rem 1.25rem;
}

.shell-tab-panel[hidden] {
  display: none;
}

.shell-loading {
  color: var(--muted-foreground);
  font-size: 0.875rem;
}

.shell-backdrop {
  display: none;
}

/* Rendered Markdown */
.prose {
  font-size: 0.9375rem;
}

.prose h1 {
  font-size: 1.375rem;
  margin-bottom: 0.75rem;
}

.prose h2 {
  font-size: 1.125rem;
  margin: 1.5rem 0 0.5rem;
}

.prose h3 {
  font-size: 1rem;
  margin: 1.25rem 0 0.5rem;
}

.prose p,
.prose ul,
.prose ol,
.prose pre,
.prose table,
.prose blockquote {
  margin-bottom: 0.875rem;
}

.prose ul,
.prose ol {
  padding-left: 1.25rem;
}

.prose code {
  font-family: ui-monospace, SFMono-Regular, Menlo, monospace;
  font-size: 0.85em;
  background: var(--muted);
  padding: 0.1rem 0.3rem;
  border-radius: 0.25rem;
}

.prose pre {
  background: var(--muted);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 0.75rem;
  overflow-x: auto;
}

.prose pre code {
  background: none;
  padding: 0;
}

.prose blockquote {
  border-left: 3px solid var(--border);
  padding-left: 0.75rem;
  color: var(--muted-foreground);
}

.prose table {
  border-collapse: collapse;
  width: 100%;
}

.prose th,
.prose td {
  border: 1px solid var(--border);
  padding: 0.375rem 0.5rem;
  text-align: left;
}

.prose-missing {
  color: var(--muted-foreground);
  font-style: italic;
}

@media (max-width: 768px) {
  .shell-brand,
  .shell-step-label,
  .shell-btn-label {
    display: none;
  }

  .shell-hamburger-btn {
    display: inline-flex;
  }

  .shell-sidebar {
    position: fixed;
    top: var(--topbar-height);
    right: 0;
    bottom: 0;
    z-index: 30;
    width: min(var(--sidebar-width), 90vw);
    transform: translateX(100%);
    transition: transform 0.2s ease;
  }

  .shell-sidebar.is-open {
    transform: translateX(0);
  }

  .shell-sidebar-close {
    display: block;
  }

  .shell-backdrop {
    position: fixed;
    inset: var(--topbar-height) 0 0 0;
    z-index: 20;
    background: rgba(0, 0, 0, 0.45);
  }

  .shell-backdrop.is-visible {
    display: block;
  }
}
"#;

const SHELL_JS: &str = r#"// Step viewer shell
(function () {
  'use strict';

  var STEP = window.SHELL_STEP || '';
  var ROOT = window.SHELL_ROOT || '../../';
  var TEXT = window.SHELL_TEXT || {};
  var MOBILE_BREAKPOINT = 768;
  var COPIED_MS = 2000;

  function t(key, params) {
    var message = TEXT[key] || key;
    Object.keys(params || {}).forEach(function (name) {
      message = message.split('{' + name + '}').join(String(params[name]));
    });
    return message;
  }

  function qs(selector) { return document.querySelector(selector); }
  function qsa(selector) { return Array.prototype.slice.call(document.querySelectorAll(selector)); }

  function escapeHtml(value) {
    return String(value)
      .replace(/&/g, '&amp;')
      .replace(/</g, '&lt;')
      .replace(/>/g, '&gt;')
      .replace(/"/g, '&quot;');
  }

  function isMobile() { return window.innerWidth <= MOBILE_BREAKPOINT; }

  // All UI state lives here. Only the operations below mutate it.
  function createState(onChange) {
    var state = {
      steps: null,
      panes: { notes: { status: 'loading', html: '' }, prompt: { status: 'loading', html: '' } },
      tab: 'notes',
      sidebarOpen: false,
      copied: false
    };

    return {
      get: function () { return state; },
      setSteps: function (steps) {
        state.steps = steps;
        onChange('steps');
      },
      setPane: function (name, status, html) {
        state.panes[name] = { status: status, html: html };
        onChange('pane', name);
      },
      selectTab: function (name) {
        if (!state.panes[name]) return;
        state.tab = name;
        onChange('tab');
      },
      setSidebarOpen: function (open) {
        if (state.sidebarOpen === open) return;
        state.sidebarOpen = open;
        onChange('sidebar');
      },
      setCopied: function (copied) {
        state.copied = copied;
        onChange('copied');
      }
    };
  }

  var dom = {
    select: qs('#shell-step-select'),
    sidebar: qs('#shell-sidebar'),
    backdrop: qs('#shell-backdrop'),
    toggle: qs('#shell-sidebar-toggle'),
    close: qs('#shell-sidebar-close'),
    copyBtn: qs('#shell-copy-btn'),
    copyIcon: qs('#shell-copy-icon'),
    copiedIcon: qs('#shell-copied-icon'),
    copyLabel: qs('#shell-copy-label'),
    panes: { notes: qs('#shell-notes-body'), prompt: qs('#shell-prompt-body') },
    tabs: qsa('.shell-tab'),
    panels: qsa('.shell-tab-panel')
  };

  var renderers = {
    steps: function (state) {
      if (!dom.select || !state.steps) return;
      dom.select.innerHTML = state.steps.map(function (s) {
        var selected = s.id === STEP ? ' selected' : '';
        return '<option value="' + escapeHtml(s.id) + '"' + selected + '>' + escapeHtml(s.label) + '</option>';
      }).join('');
    },
    pane: function (state, name) {
      var container = dom.panes[name];
      var pane = state.panes[name];
      if (!container) return;
      if (pane.status === 'error') {
        container.innerHTML = '<p class="prose-missing">' + escapeHtml(t('load_failed', { error: pane.html })) + '</p>';
        return;
      }
      if (pane.status !== 'ready') return;
      container.innerHTML = pane.html;
      qsa('#' + container.id + ' a[href]').forEach(function (a) {
        var href = a.getAttribute('href') || '';
        if (href.indexOf('http://') === 0 || href.indexOf('https://') === 0) {
          a.setAttribute('target', '_blank');
          a.setAttribute('rel', 'noopener noreferrer');
        }
      });
    },
    tab: function (state) {
      dom.tabs.forEach(function (tab) {
        var active = tab.getAttribute('data-tab') === state.tab;
        tab.classList.toggle('shell-tab--active', active);
        tab.setAttribute('aria-selected', String(active));
        tab.setAttribute('tabindex', active ? '0' : '-1');
      });
      dom.panels.forEach(function (panel) {
        var active = panel.id === 'panel-' + state.tab;
        panel.classList.toggle('shell-tab-panel--active', active);
        panel.hidden = !active;
      });
    },
    sidebar: function (state) {
      var open = state.sidebarOpen;
      if (dom.sidebar) dom.sidebar.classList.toggle('is-open', open);
      if (dom.backdrop) dom.backdrop.classList.toggle('is-visible', open);
      if (dom.toggle) {
        dom.toggle.setAttribute('aria-expanded', String(open || !isMobile()));
        var menuIcon = dom.toggle.querySelector('.icon-menu');
        var closeIcon = dom.toggle.querySelector('.icon-close');
        if (menuIcon) menuIcon.hidden = open;
        if (closeIcon) closeIcon.hidden = !open;
      }
      if (open) {
        document.addEventListener('keydown', onEscape);
      } else {
        document.removeEventListener('keydown', onEscape);
      }
    },
    copied: function (state) {
      if (!dom.copyBtn) return;
      dom.copyBtn.classList.toggle('copied', state.copied);
      if (dom.copyIcon) dom.copyIcon.hidden = state.copied;
      if (dom.copiedIcon) dom.copiedIcon.hidden = !state.copied;
      if (dom.copyLabel) dom.copyLabel.textContent = state.copied ? t('copied') : t('copy_link');
    }
  };

  var store = createState(function (what, arg) {
    renderers[what](store.get(), arg);
  });

  function onEscape(e) {
    if (e.key === 'Escape') store.setSidebarOpen(false);
  }

  // Manifest refresh; static options stay on failure.
  fetch(ROOT + 'steps.json')
    .then(function (r) { return r.json(); })
    .then(function (steps) {
      if (Array.isArray(steps) && steps.length > 0) store.setSteps(steps);
    })
    .catch(function () {});

  if (dom.select) {
    dom.select.addEventListener('change', function () {
      var chosen = dom.select.value;
      if (chosen && chosen !== STEP) {
        window.location.href = ROOT + 'view/' + chosen + '/';
      }
    });
  }

  function loadPane(name, file) {
    if (!dom.panes[name]) return;
    fetch(ROOT + STEP + '/' + file)
      .then(function (r) {
        if (!r.ok) throw new Error('HTTP ' + r.status);
        return r.text();
      })
      .then(function (html) { store.setPane(name, 'ready', html); })
      .catch(function (err) { store.setPane(name, 'error', err.message); });
  }

  loadPane('notes', 'notes.html');
  loadPane('prompt', 'prompt.html');

  dom.tabs.forEach(function (tab) {
    tab.addEventListener('click', function () {
      store.selectTab(tab.getAttribute('data-tab'));
    });
  });

  function copyFallback(url) {
    var ta = document.createElement('textarea');
    ta.value = url;
    ta.style.cssText = 'position:fixed;opacity:0;top:0;left:0';
    document.body.appendChild(ta);
    ta.select();
    var ok = document.execCommand('copy');
    document.body.removeChild(ta);
    return ok;
  }

  var copiedTimer = null;

  function showCopied() {
    store.setCopied(true);
    clearTimeout(copiedTimer);
    copiedTimer = setTimeout(function () { store.setCopied(false); }, COPIED_MS);
  }

  if (dom.copyBtn) {
    dom.copyBtn.addEventListener('click', function () {
      var url = window.location.href;
      var primary = navigator.clipboard && navigator.clipboard.writeText
        ? navigator.clipboard.writeText(url)
        : Promise.reject(new Error('clipboard unavailable'));
      primary.then(showCopied).catch(function () {
        try {
          if (copyFallback(url)) showCopied();
        } catch (_) {}
      });
    });
  }

  if (dom.toggle) {
    dom.toggle.addEventListener('click', function () {
      if (!isMobile()) return;
      store.setSidebarOpen(!store.get().sidebarOpen);
    });
  }
  if (dom.close) dom.close.addEventListener('click', function () { store.setSidebarOpen(false); });
  if (dom.backdrop) dom.backdrop.addEventListener('click', function () { store.setSidebarOpen(false); });

  window.addEventListener('resize', function () {
    if (!isMobile()) store.setSidebarOpen(false);
  });

  renderers.sidebar(store.get());
  renderers.tab(store.get());
})();
"#;
