//! Capability Neutralizer for Pagefreeze.
//!
//! The neutralization policy is a declarative [`StandInTable`]: each entry
//! names a scope in the page world, a member on it, and what the stand-in
//! does instead of the real call. [`install_stand_ins`] applies a table to any
//! [`InstallTarget`]; [`ScriptEmitter`] is the target that renders the
//! self-contained page-world script the host injects on navigation commit.
//!
//! The emitted script never throws: every install step and the optional
//! post-load normalization pass are wrapped so failures only reach the page
//! console. Its completion value is `1`, the liveness signal for the host.

use std::fmt::Write as _;

use crate::types::errors::NeutralizeError;
use crate::types::settings::{FreezeSettings, NormalizationSettings};

/// Page-world object whose members are replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetScope {
    Window,
    Document,
    ElementPrototype,
    XmlHttpRequestPrototype,
    IntersectionObserverPrototype,
}

impl TargetScope {
    pub const ALL: [TargetScope; 5] = [
        TargetScope::Window,
        TargetScope::Document,
        TargetScope::ElementPrototype,
        TargetScope::XmlHttpRequestPrototype,
        TargetScope::IntersectionObserverPrototype,
    ];

    /// Name used in diagnostics, e.g. `Element.prototype`.
    pub fn label(&self) -> &'static str {
        match self {
            TargetScope::Window => "window",
            TargetScope::Document => "document",
            TargetScope::ElementPrototype => "Element.prototype",
            TargetScope::XmlHttpRequestPrototype => "XMLHttpRequest.prototype",
            TargetScope::IntersectionObserverPrototype => "IntersectionObserver.prototype",
        }
    }

    /// Expression evaluating to the scope object, or `null` when the page lacks it.
    fn js_expression(&self) -> &'static str {
        match self {
            TargetScope::Window => "(typeof window === \"object\" ? window : null)",
            TargetScope::Document => "(typeof document === \"object\" ? document : null)",
            TargetScope::ElementPrototype => {
                "(typeof Element === \"function\" ? Element.prototype : null)"
            }
            TargetScope::XmlHttpRequestPrototype => {
                "(typeof XMLHttpRequest === \"function\" ? XMLHttpRequest.prototype : null)"
            }
            TargetScope::IntersectionObserverPrototype => {
                "(typeof IntersectionObserver === \"function\" ? IntersectionObserver.prototype : null)"
            }
        }
    }
}

/// Fixed value a stand-in hands back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// Explicit `undefined`.
    Undefined,
    /// A promise that is already fulfilled with `undefined`.
    ResolvedPromise,
    /// A promise that never settles; callers wait forever.
    PendingPromise,
    /// No return statement at all.
    Nothing,
}

impl Placeholder {
    fn js_return(&self) -> Option<&'static str> {
        match self {
            Placeholder::Undefined => Some("return undefined;"),
            Placeholder::ResolvedPromise => Some("return Promise.resolve(undefined);"),
            Placeholder::PendingPromise => Some("return new Promise(function () {});"),
            Placeholder::Nothing => None,
        }
    }
}

/// Behavior installed in place of the real member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    /// Log (optionally) and hand back a fixed placeholder.
    Return(Placeholder),
    /// `createElement("script")` yields an inert `<template>`; other tags go
    /// to the original implementation.
    DivertScriptElements,
}

/// One row of the neutralization policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandIn {
    pub scope: TargetScope,
    pub member: String,
    pub replacement: Replacement,
}

impl StandIn {
    pub fn new(scope: TargetScope, member: impl Into<String>, replacement: Replacement) -> Self {
        Self {
            scope,
            member: member.into(),
            replacement,
        }
    }

    /// `scope.member`, as used in logs.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.scope.label(), self.member)
    }
}

/// Ordered neutralization policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandInTable {
    entries: Vec<StandIn>,
}

impl StandInTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listener registration, timers, outbound requests and intersection observation.
    pub fn standard() -> Self {
        use Placeholder::*;
        use TargetScope::*;

        let rows: [(TargetScope, &str, Placeholder); 13] = [
            (Window, "addEventListener", Undefined),
            (Window, "setTimeout", Undefined),
            (Window, "setInterval", Undefined),
            (Window, "fetch", PendingPromise),
            (Document, "addEventListener", Undefined),
            (ElementPrototype, "addEventListener", Undefined),
            (XmlHttpRequestPrototype, "open", Undefined),
            (XmlHttpRequestPrototype, "setRequestHeader", Undefined),
            (XmlHttpRequestPrototype, "send", Undefined),
            (XmlHttpRequestPrototype, "addEventListener", Undefined),
            (IntersectionObserverPrototype, "observe", Nothing),
            (IntersectionObserverPrototype, "unobserve", Nothing),
            (IntersectionObserverPrototype, "disconnect", Nothing),
        ];

        let mut table = Self::new();
        for (scope, member, placeholder) in rows {
            table.push(StandIn::new(scope, member, Replacement::Return(placeholder)));
        }
        table
    }

    /// Table derived from user settings.
    pub fn from_settings(settings: &FreezeSettings) -> Self {
        let mut table = Self::standard();
        if settings.divert_script_elements {
            table.push(StandIn::new(
                TargetScope::Document,
                "createElement",
                Replacement::DivertScriptElements,
            ));
        }
        table
    }

    /// Appends `stand_in`, replacing an existing row for the same scope and member.
    pub fn push(&mut self, stand_in: StandIn) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.scope == stand_in.scope && e.member == stand_in.member)
        {
            Some(existing) => *existing = stand_in,
            None => self.entries.push(stand_in),
        }
    }

    pub fn lookup(&self, scope: TargetScope, member: &str) -> Option<&StandIn> {
        self.entries.iter().find(|e| e.scope == scope && e.member == member)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StandIn> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Something stand-ins can be installed into.
pub trait InstallTarget {
    fn install(&mut self, stand_in: &StandIn) -> Result<(), NeutralizeError>;
}

/// Result of applying a table.
#[derive(Debug, Default)]
pub struct InstallReport {
    pub installed: Vec<String>,
    pub failed: Vec<(String, NeutralizeError)>,
}

impl InstallReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Installs every row of `table` into `target`.
///
/// A failing row is logged and skipped; the remaining rows are still installed.
pub fn install_stand_ins(table: &StandInTable, target: &mut dyn InstallTarget) -> InstallReport {
    let mut report = InstallReport::default();
    for stand_in in table.iter() {
        let name = stand_in.qualified_name();
        match target.install(stand_in) {
            Ok(()) => report.installed.push(name),
            Err(e) => {
                tracing::warn!(stand_in = %name, error = %e, "stand-in not installed");
                report.failed.push((name, e));
            }
        }
    }
    report
}

fn is_js_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// JSON string literals are valid JS string literals.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Renders stand-ins as page-world install statements.
#[derive(Debug, Default)]
pub struct ScriptEmitter {
    log_blocked_calls: bool,
    statements: String,
}

impl ScriptEmitter {
    pub fn new(log_blocked_calls: bool) -> Self {
        Self {
            log_blocked_calls,
            statements: String::new(),
        }
    }

    pub fn into_statements(self) -> String {
        self.statements
    }

    fn stand_in_factory(&self, stand_in: &StandIn) -> String {
        let log = if self.log_blocked_calls {
            format!("pageLog({});", js_string(&format!("Prevented {}", stand_in.qualified_name())))
        } else {
            String::new()
        };
        match stand_in.replacement {
            Replacement::Return(placeholder) => format!(
                "function () {{ return function () {{ {}{} }}; }}",
                log,
                placeholder.js_return().unwrap_or("")
            ),
            Replacement::DivertScriptElements => format!(
                "function (original) {{ return function (name) {{ \
                 if (String(name).toLowerCase() === \"script\") {{ {}return original.call(document, \"template\"); }} \
                 return original.apply(this, arguments); }}; }}",
                log
            ),
        }
    }
}

impl InstallTarget for ScriptEmitter {
    fn install(&mut self, stand_in: &StandIn) -> Result<(), NeutralizeError> {
        if !is_js_identifier(&stand_in.member) {
            return Err(NeutralizeError::MissingMember(stand_in.qualified_name()));
        }
        let factory = self.stand_in_factory(stand_in);
        let _ = writeln!(
            self.statements,
            "    install({}, {}, {}, {});",
            stand_in.scope.js_expression(),
            js_string(stand_in.scope.label()),
            js_string(&stand_in.member),
            factory
        );
        Ok(())
    }
}

const PAYLOAD_PRELUDE: &str = r#"(function () {
  "use strict";
  function pageLog() {
    try {
      console.info.apply(console, ["Pagefreeze:"].concat(Array.prototype.slice.call(arguments)));
    } catch (e) {}
  }
  var installed = 0;
  function install(target, label, member, makeStandIn) {
    try {
      if (target == null) {
        pageLog("scope unavailable:", label);
        return;
      }
      var standIn = makeStandIn(target[member]);
      try {
        target[member] = standIn;
      } catch (e) {}
      if (target[member] !== standIn) {
        Object.defineProperty(target, member, { value: standIn, configurable: true, writable: true });
      }
      installed += 1;
    } catch (e) {
      pageLog("could not neutralize " + label + "." + member, e);
    }
  }
  try {
"#;

const PAYLOAD_EPILOGUE: &str = r#"  } catch (e) {
    pageLog("neutralizer failed", e);
  }
  return 1;
})();
"#;

/// Renders the post-load normalization listener, or an empty string when disabled.
///
/// Must run before the stand-ins are installed: it registers through the
/// page's native `document.addEventListener`.
fn normalization_script(settings: &NormalizationSettings) -> String {
    if !settings.enabled || (!settings.promote_lazy_images && !settings.pin_fixed_elements) {
        return String::new();
    }

    let mut body = String::new();
    if settings.promote_lazy_images {
        let attr = js_string(&settings.lazy_source_attribute);
        let _ = write!(
            body,
            r#"
          if (el instanceof HTMLImageElement) {{
            var deferred = el.getAttribute({attr});
            if (!el.getAttribute("src") && deferred != null) {{
              el.setAttribute("src", deferred);
              el.removeAttribute({attr});
            }}
          }}"#
        );
    }
    if settings.pin_fixed_elements {
        body.push_str(
            r#"
          var position = window.getComputedStyle(el).position;
          if (!okPositions[position]) {
            el.style.setProperty("position", position === "fixed" ? "absolute" : "relative", "important");
          }"#,
        );
    }

    format!(
        r#"    document.addEventListener("DOMContentLoaded", function () {{
      try {{
        var okPositions = {{ "static": true, "relative": true, "absolute": true }};
        var all = document.querySelectorAll("*");
        for (var i = 0; i < all.length; i++) {{
          var el = all[i];
          if (!(el instanceof HTMLElement)) continue;{body}
        }}
      }} catch (e) {{
        pageLog("normalization failed", e);
      }}
    }});
"#
    )
}

/// Self-contained page-world script deploying a stand-in table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeutralizerPayload {
    source: String,
    stand_ins: Vec<String>,
}

impl NeutralizerPayload {
    /// Builds the payload for `table`.
    ///
    /// Rows the emitter rejects are left out of the script and logged.
    pub fn build(table: &StandInTable, normalization: &NormalizationSettings, log_blocked_calls: bool) -> Self {
        let mut emitter = ScriptEmitter::new(log_blocked_calls);
        let report = install_stand_ins(table, &mut emitter);

        let mut source = String::from(PAYLOAD_PRELUDE);
        source.push_str(&normalization_script(normalization));
        source.push_str(&emitter.into_statements());
        if log_blocked_calls {
            source.push_str("    pageLog(\"neutralized\", installed, \"entry points\");\n");
        }
        source.push_str(PAYLOAD_EPILOGUE);

        Self {
            source,
            stand_ins: report.installed,
        }
    }

    pub fn from_settings(settings: &FreezeSettings) -> Self {
        Self::build(
            &StandInTable::from_settings(settings),
            &settings.normalization,
            settings.log_blocked_calls,
        )
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Qualified names of the entry points the script replaces.
    pub fn stand_ins(&self) -> &[String] {
        &self.stand_ins
    }
}
