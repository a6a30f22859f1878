//! Fähigkeiten-Tabelle: welche Eigenschaft welches Objekttyps die Oberfläche
//! in-place ändern kann und welche einen Austausch des Objekts erfordert.

use super::{VisualKind, VisualProperty};

/// Wie eine geänderte Eigenschaft auf die Oberfläche gelangt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Eigenschaft wird am bestehenden Objekt gesetzt
    Reactive,
    /// Objekt muss entfernt und neu hinzugefügt werden
    RequiresSubstitution,
    /// Eigenschaft existiert für diesen Objekttyp nicht
    Unsupported,
}

/// Schlägt die Fähigkeit einer Eigenschaft für einen Objekttyp nach.
pub fn capability(kind: VisualKind, property: VisualProperty) -> Capability {
    use Capability::*;
    use VisualKind as K;
    use VisualProperty as P;

    match (kind, property) {
        // Regionen: ein GeoJSON-Objekt, der Stil-Callback wird nur beim Hinzufügen ausgewertet
        (K::Regions, P::Visible | P::Opacity | P::Color | P::Fill | P::Weight) => Reactive,
        (K::Regions, P::FeatureColors | P::Data) => RequiresSubstitution,

        (K::Markers, P::Visible | P::Opacity | P::Color | P::Radius | P::Data) => Reactive,

        // Heatmap: nur Punkte und Sichtbarkeit sind reaktiv
        (K::Heatmap, P::Visible | P::Data) => Reactive,
        (K::Heatmap, P::Opacity | P::Radius | P::Blur | P::Gradient | P::Color) => {
            RequiresSubstitution
        }

        (K::Image, P::Visible | P::Opacity) => Reactive,
        (K::Image, P::Data | P::Color) => RequiresSubstitution,

        (K::Shape, P::Visible | P::Color | P::Opacity | P::Weight) => Reactive,
        (K::Shape, P::Bounds) => RequiresSubstitution,

        _ => Unsupported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heatmap_gradient_requires_substitution() {
        assert_eq!(
            capability(VisualKind::Heatmap, VisualProperty::Gradient),
            Capability::RequiresSubstitution
        );
        assert_eq!(
            capability(VisualKind::Heatmap, VisualProperty::Data),
            Capability::Reactive
        );
    }

    #[test]
    fn region_feature_colors_require_substitution() {
        assert_eq!(
            capability(VisualKind::Regions, VisualProperty::FeatureColors),
            Capability::RequiresSubstitution
        );
        assert_eq!(
            capability(VisualKind::Regions, VisualProperty::Opacity),
            Capability::Reactive
        );
    }

    #[test]
    fn marker_properties_are_reactive() {
        for property in [
            VisualProperty::Visible,
            VisualProperty::Opacity,
            VisualProperty::Color,
            VisualProperty::Radius,
            VisualProperty::Data,
        ] {
            assert_eq!(capability(VisualKind::Markers, property), Capability::Reactive);
        }
        assert_eq!(
            capability(VisualKind::Markers, VisualProperty::Gradient),
            Capability::Unsupported
        );
    }
}
