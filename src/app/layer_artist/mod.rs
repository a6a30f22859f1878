//! Layer-Controller: hält einen Layer-Zustand mit genau einem Visual Object
//! auf der Kartenoberfläche synchron.
//!
//! Jeder Abgleich vergleicht den aktuellen Zustand mit dem zuletzt gesehenen
//! Stand, aktualisiert den Stand sofort und wendet nur die Differenz an:
//! reaktive Eigenschaften in-place, alles andere per Austausch des Objekts.

mod build;
#[cfg(test)]
mod tests;

use std::collections::BTreeSet;

use build::{build_visual, collect_values, LayerValues};

use super::layer_state::{LayerField, LimitsCache, VisualLayerState};
use super::MapViewerState;
use crate::core::{finite_range, GeometryKind, LayerSource, SubsetState};
use crate::render::{capability, Capability, MapSurface, VisualId, VisualObject, VisualProperty};
use crate::shared::{Color, ViewerOptions};

/// Kennung eines Layers im Viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

/// Lebenszyklus eines Layer-Controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtistPhase {
    /// Noch nicht an die Oberfläche angehängt
    Uninitialized,
    /// Synchron
    Idle,
    /// Ein Attribut ist für die Daten ungültig, kein Objekt auf der Oberfläche
    Disabled,
    /// Endgültig entfernt
    Removed,
}

/// Ergebnis eines Abgleichs.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Nichts geändert, keine Mutation
    Unchanged,
    /// Nicht angehängt, entfernt oder deaktiviert ohne auslösende Änderung
    Inactive,
    /// Voraussetzungen fehlen (Achsen-Attribute), keine Mutation
    NotReady,
    /// Eigenschaften in-place gesetzt (leer = Ziel war bereits dargestellt)
    Updated(Vec<VisualProperty>),
    /// Objekt ausgetauscht
    Substituted,
    /// Objekt neu hinzugefügt (nach Deaktivierung)
    Added,
    /// Layer deaktiviert und Objekt entfernt
    Disabled,
}

/// Zuletzt gesehener Stand aller beobachteten Felder.
#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    lat_att: Option<String>,
    lon_att: Option<String>,
    style: VisualLayerState,
}

impl Snapshot {
    fn capture(viewer: &MapViewerState, style: &VisualLayerState) -> Self {
        Self {
            lat_att: viewer.lat_att.clone(),
            lon_att: viewer.lon_att.clone(),
            style: style.clone(),
        }
    }

    fn diff(&self, previous: &Snapshot) -> BTreeSet<LayerField> {
        let mut changed = self.style.changed_fields(&previous.style);
        if self.lat_att != previous.lat_att {
            changed.insert(LayerField::LatAttribute);
        }
        if self.lon_att != previous.lon_att {
            changed.insert(LayerField::LonAttribute);
        }
        changed
    }
}

/// Alle Felder, für den ersten Abgleich.
const ALL_FIELDS: [LayerField; 18] = [
    LayerField::LatAttribute,
    LayerField::LonAttribute,
    LayerField::Visible,
    LayerField::Color,
    LayerField::Alpha,
    LayerField::Fill,
    LayerField::ColorMode,
    LayerField::ColorAttribute,
    LayerField::ColorMin,
    LayerField::ColorMax,
    LayerField::ColorTable,
    LayerField::Size,
    LayerField::SizeMode,
    LayerField::SizeAttribute,
    LayerField::SizeMin,
    LayerField::SizeMax,
    LayerField::SizeScaling,
    LayerField::DisplayMode,
];

/// Eigenschaften, die ein kosmetisches Feld beeinflussen kann.
fn affected_properties(field: LayerField) -> &'static [VisualProperty] {
    use VisualProperty as P;
    match field {
        LayerField::Visible => &[P::Visible],
        LayerField::Alpha => &[P::Opacity, P::Fill],
        LayerField::Fill => &[P::Fill],
        LayerField::Color
        | LayerField::ColorMin
        | LayerField::ColorMax
        | LayerField::ColorTable => &[P::Color, P::FeatureColors, P::Gradient, P::Data],
        LayerField::Size | LayerField::SizeMin | LayerField::SizeMax | LayerField::SizeScaling => {
            &[P::Radius]
        }
        _ => &VisualProperty::ALL,
    }
}

/// Was mit dem bestehenden Objekt geschehen soll.
enum Plan {
    Add,
    Substitute,
    Update(Vec<VisualProperty>),
}

/// Alles, was ein Abgleich von außen braucht.
pub struct SyncContext<'a> {
    pub viewer: &'a MapViewerState,
    pub options: &'a ViewerOptions,
    pub surface: &'a mut MapSurface,
}

/// Controller eines Layers.
#[derive(Debug)]
pub struct LayerArtist {
    id: LayerId,
    source: LayerSource,
    kind: GeometryKind,
    state: VisualLayerState,
    phase: ArtistPhase,
    visual: Option<VisualId>,
    cache: Option<Snapshot>,
    values: Option<LayerValues>,
    limits: LimitsCache,
    disabled_reason: Option<String>,
}

impl LayerArtist {
    /// Erstellt einen Controller mit Startzustand für die Quelle.
    pub fn new(id: LayerId, source: LayerSource, options: &ViewerOptions, color: Color) -> Self {
        let kind = source.collection().kind();
        let state = VisualLayerState::for_source(&source, options, color);
        Self {
            id,
            source,
            kind,
            state,
            phase: ArtistPhase::Uninitialized,
            visual: None,
            cache: None,
            values: None,
            limits: LimitsCache::default(),
            disabled_reason: None,
        }
    }

    // ── Zugriff ─────────────────────────────────────────────────────

    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Datenquelle.
    pub fn source(&self) -> &LayerSource {
        &self.source
    }

    /// Geometrie-Art der Quelle.
    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    /// Darstellungszustand.
    pub fn state(&self) -> &VisualLayerState {
        &self.state
    }

    /// Darstellungszustand zum Ändern. Änderungen wirken erst mit `update`.
    pub fn state_mut(&mut self) -> &mut VisualLayerState {
        &mut self.state
    }

    pub fn phase(&self) -> ArtistPhase {
        self.phase
    }

    /// Handle des aktuellen Objekts auf der Oberfläche.
    pub fn visual_id(&self) -> Option<VisualId> {
        self.visual
    }

    /// Grund der letzten Deaktivierung.
    pub fn disabled_reason(&self) -> Option<&str> {
        self.disabled_reason.as_deref()
    }

    /// Ersetzt den Auswahlzustand eines Subset-Layers. Die Daten werden beim
    /// nächsten erzwungenen Abgleich neu gelesen.
    ///
    /// Gibt `false` zurück, wenn der Layer kein Subset darstellt.
    pub fn set_subset_state(&mut self, state: SubsetState) -> bool {
        match &mut self.source {
            LayerSource::Subset(subset) => {
                subset.state = state;
                self.values = None;
                true
            }
            LayerSource::Collection(_) => false,
        }
    }

    // ── Lebenszyklus ────────────────────────────────────────────────

    /// Hängt ein leeres Platzhalter-Objekt an die Oberfläche.
    pub fn attach(&mut self, ctx: &mut SyncContext<'_>) -> Option<VisualId> {
        if self.phase != ArtistPhase::Uninitialized {
            return self.visual;
        }
        let placeholder = build_visual(
            &self.source,
            self.kind,
            &self.state,
            &LayerValues::default(),
            ctx.options,
        );
        let id = ctx.surface.add_layer(placeholder);
        log::debug!("Layer '{}' angehängt als {}", self.source.label(), id);
        self.visual = Some(id);
        self.phase = ArtistPhase::Idle;
        self.visual
    }

    /// Entfernt das Objekt endgültig. Mehrfaches Entfernen ist unschädlich.
    pub fn remove(&mut self, surface: &mut MapSurface) {
        if let Some(id) = self.visual.take() {
            if let Err(e) = surface.remove_layer(id) {
                log::debug!("Layer '{}' entfernen: {}", self.source.label(), e);
            }
        }
        self.phase = ArtistPhase::Removed;
    }

    /// Gleicht die Oberfläche mit dem aktuellen Zustand ab.
    ///
    /// Ohne geänderte Felder und ohne `force` erfolgt keine Mutation. `force`
    /// signalisiert geänderte Daten (z.B. neuer Subset-Zustand).
    pub fn update(&mut self, ctx: &mut SyncContext<'_>, force: bool) -> SyncOutcome {
        if matches!(self.phase, ArtistPhase::Uninitialized | ArtistPhase::Removed) {
            return SyncOutcome::Inactive;
        }

        let snapshot = Snapshot::capture(ctx.viewer, &self.state);
        let mut changed = match &self.cache {
            Some(previous) => snapshot.diff(previous),
            None => ALL_FIELDS.into_iter().collect(),
        };
        let previous = self.cache.replace(snapshot);

        if changed.is_empty() && !force {
            return SyncOutcome::Unchanged;
        }

        if self.phase == ArtistPhase::Disabled
            && !force
            && !changed.iter().any(|field| field.selects_data())
        {
            return SyncOutcome::Inactive;
        }

        if self.init_limits(&changed, previous.as_ref()) {
            changed.extend([
                LayerField::ColorMin,
                LayerField::ColorMax,
                LayerField::SizeMin,
                LayerField::SizeMax,
            ]);
            self.cache = Some(Snapshot::capture(ctx.viewer, &self.state));
        }

        let refetch =
            force || self.values.is_none() || changed.iter().any(|field| field.selects_data());
        if refetch {
            match collect_values(&self.source, self.kind, &self.state, ctx.viewer) {
                Ok(Some(values)) => self.values = Some(values),
                Ok(None) => {
                    log::debug!(
                        "Layer '{}': Achsen-Attribute nicht gesetzt",
                        self.source.label()
                    );
                    self.values = None;
                    self.hide_visual(ctx.surface);
                    return SyncOutcome::NotReady;
                }
                Err(e) => return self.disable(ctx.surface, e.to_string()),
            }
        }
        let Some(values) = self.values.as_ref() else {
            return SyncOutcome::NotReady;
        };

        let target = build_visual(&self.source, self.kind, &self.state, values, ctx.options);
        let properties: BTreeSet<VisualProperty> = if refetch {
            VisualProperty::ALL.into_iter().collect()
        } else {
            changed
                .iter()
                .flat_map(|&field| affected_properties(field).iter().copied())
                .collect()
        };

        let plan = match self.visual.and_then(|id| ctx.surface.layer(id)) {
            None => Plan::Add,
            Some(current) if current.kind() != target.kind() => Plan::Substitute,
            Some(current) => plan_update(current, &target, &properties),
        };
        self.apply(ctx.surface, plan, target)
    }

    fn apply(&mut self, surface: &mut MapSurface, plan: Plan, target: VisualObject) -> SyncOutcome {
        match (plan, self.visual) {
            (Plan::Update(properties), Some(id)) => {
                for &property in &properties {
                    if let Err(e) = surface.update_property(id, &target, property) {
                        log::debug!("Layer '{}': {}", self.source.label(), e);
                    }
                }
                SyncOutcome::Updated(properties)
            }
            (Plan::Substitute, Some(old)) => {
                self.visual = Some(surface.substitute_layer(old, target));
                self.phase = ArtistPhase::Idle;
                SyncOutcome::Substituted
            }
            _ => {
                self.visual = Some(surface.add_layer(target));
                self.phase = ArtistPhase::Idle;
                self.disabled_reason = None;
                log::info!("Layer '{}' wieder aktiv", self.source.label());
                SyncOutcome::Added
            }
        }
    }

    fn disable(&mut self, surface: &mut MapSurface, reason: String) -> SyncOutcome {
        log::warn!("Layer '{}' deaktiviert: {}", self.source.label(), reason);
        self.hide_visual(surface);
        self.phase = ArtistPhase::Disabled;
        self.values = None;
        self.disabled_reason = Some(reason);
        SyncOutcome::Disabled
    }

    /// Nimmt das Objekt von der Oberfläche; der nächste vollständige Abgleich
    /// fügt es neu hinzu.
    fn hide_visual(&mut self, surface: &mut MapSurface) {
        if let Some(id) = self.visual.take() {
            if let Err(e) = surface.remove_layer(id) {
                log::debug!("Layer '{}' entfernen: {}", self.source.label(), e);
            }
        }
    }

    /// Setzt Farb-/Größengrenzen nach einem Attributwechsel: zuerst aus dem
    /// Cache, sonst aus dem Wertebereich der dargestellten Zeilen.
    fn init_limits(&mut self, changed: &BTreeSet<LayerField>, previous: Option<&Snapshot>) -> bool {
        let mut updated = false;
        let previous = previous.map(|snapshot| &snapshot.style);

        if changed.contains(&LayerField::ColorAttribute) {
            if let Some(prev) = previous {
                if let Some(att) = &prev.color_attribute {
                    self.limits.store_color(att, (prev.color_min, prev.color_max));
                }
            }
            if let Some(att) = self.state.color_attribute.clone() {
                let limits = self
                    .limits
                    .color(&att)
                    .or_else(|| self.attribute_range(&att));
                if let Some((lo, hi)) = limits {
                    self.state.color_min = lo;
                    self.state.color_max = hi;
                    updated = true;
                }
            }
        }

        if changed.contains(&LayerField::SizeAttribute) {
            if let Some(prev) = previous {
                if let Some(att) = &prev.size_attribute {
                    self.limits.store_size(att, (prev.size_min, prev.size_max));
                }
            }
            if let Some(att) = self.state.size_attribute.clone() {
                let limits = self
                    .limits
                    .size(&att)
                    .or_else(|| self.attribute_range(&att));
                if let Some((lo, hi)) = limits {
                    self.state.size_min = lo;
                    self.state.size_max = hi;
                    updated = true;
                }
            }
        }

        updated
    }

    fn attribute_range(&self, attribute: &str) -> Option<(f64, f64)> {
        let values = self.source.collection().numeric_values(attribute).ok()?;
        let rows = self.source.rows().ok()?;
        let selected: Vec<f64> = rows
            .iter()
            .filter_map(|&row| values.get(row).copied())
            .collect();
        finite_range(&selected)
    }
}

/// Vergleicht Ziel und Bestand je Eigenschaft und entscheidet per
/// Fähigkeiten-Tabelle zwischen In-place-Update und Austausch.
fn plan_update(
    current: &VisualObject,
    target: &VisualObject,
    properties: &BTreeSet<VisualProperty>,
) -> Plan {
    let mut reactive = Vec::new();
    for &property in properties {
        if current.same_property(target, property) {
            continue;
        }
        match capability(target.kind(), property) {
            Capability::Reactive => reactive.push(property),
            Capability::RequiresSubstitution => return Plan::Substitute,
            Capability::Unsupported => {}
        }
    }
    Plan::Update(reactive)
}
