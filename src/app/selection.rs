//! Übersetzung von ROIs in Subset-Zustände.

use crate::core::{Roi, SubsetState};

/// Wandelt eine ROI in einen Subset-Zustand über den Anzeigeachsen `(x, y)`.
///
/// Kategorie-ROIs wählen über ihr eigenes Attribut und brauchen keine Achsen.
/// Räumliche ROIs ohne Achsen ergeben `None`.
pub fn roi_to_subset(roi: &Roi, axes: Option<(&str, &str)>) -> Option<SubsetState> {
    match roi {
        Roi::Category {
            attribute,
            categories,
        } => Some(SubsetState::Category {
            attribute: attribute.clone(),
            categories: categories.clone(),
        }),
        spatial => {
            let (x_att, y_att) = axes?;
            Some(SubsetState::Roi {
                x_att: x_att.to_string(),
                y_att: y_att.to_string(),
                roi: spatial.clone(),
            })
        }
    }
}

/// Vereinigt mehrere ROIs zu einem Zustand. Eine einzelne ROI wird nicht
/// verpackt, eine leere Liste ergibt `None`.
pub fn rois_to_subset(rois: &[Roi], axes: Option<(&str, &str)>) -> Option<SubsetState> {
    let mut states = rois
        .iter()
        .map(|roi| roi_to_subset(roi, axes))
        .collect::<Option<Vec<_>>>()?;
    match states.len() {
        0 => None,
        1 => states.pop(),
        _ => Some(SubsetState::Or(states)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    #[test]
    fn spatial_roi_keeps_axes() {
        let roi = Roi::rectangle(DVec2::new(0.0, 0.0), DVec2::new(1.0, 1.0));
        match roi_to_subset(&roi, Some(("lon", "lat"))) {
            Some(SubsetState::Roi { x_att, y_att, roi: inner }) => {
                assert_eq!(x_att, "lon");
                assert_eq!(y_att, "lat");
                assert_eq!(inner, roi);
            }
            other => panic!("ROI-Zustand erwartet, war {:?}", other),
        }
    }

    #[test]
    fn spatial_roi_without_axes_selects_nothing() {
        let roi = Roi::rectangle(DVec2::new(0.0, 0.0), DVec2::new(1.0, 1.0));
        assert!(roi_to_subset(&roi, None).is_none());
    }

    #[test]
    fn category_roi_ignores_axes() {
        let roi = Roi::category("state", ["TX"]);
        assert!(matches!(
            roi_to_subset(&roi, None),
            Some(SubsetState::Category { ref attribute, .. }) if attribute == "state"
        ));
    }

    #[test]
    fn several_rois_are_unioned() {
        let axes = Some(("x", "y"));
        let a = Roi::rectangle(DVec2::new(0.0, 0.0), DVec2::new(1.0, 1.0));
        let b = Roi::rectangle(DVec2::new(2.0, 2.0), DVec2::new(3.0, 3.0));
        assert!(rois_to_subset(&[], axes).is_none());
        assert!(matches!(
            rois_to_subset(std::slice::from_ref(&a), axes),
            Some(SubsetState::Roi { .. })
        ));
        match rois_to_subset(&[a, b], axes) {
            Some(SubsetState::Or(parts)) => assert_eq!(parts.len(), 2),
            other => panic!("Vereinigung erwartet, war {:?}", other),
        }
    }
}
