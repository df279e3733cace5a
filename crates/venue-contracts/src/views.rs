use serde::{Deserialize, Serialize};

pub const BLUEPRINT_PLACEHOLDER: &str = "{blueprint}";

pub const FLOOR_PLAN_LABEL: &str = "Floor Plan";
pub const MAIN_EVENT_SPACE_LABEL: &str = "Main Event Space";
pub const SIDE_VIEW_LABEL: &str = "Side View";

/// One fixed output category and its instruction template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSpec {
    pub label: &'static str,
    pub prompt_template: &'static str,
}

impl ViewSpec {
    pub fn instruction_for(&self, blueprint_text: &str) -> String {
        self.prompt_template
            .replace(BLUEPRINT_PLACEHOLDER, blueprint_text)
    }
}

pub static VIEW_SPECS: [ViewSpec; 3] = [
    ViewSpec {
        label: FLOOR_PLAN_LABEL,
        prompt_template: "Create a professional architectural FLOOR PLAN of this venue set up for the event.

VENUE BLUEPRINT:
{blueprint}

STRICT RULES:
- Pure top-down, 2-D technical drawing. No perspective, no 3-D, no isometric angle.
- Draw walls, doors, windows and fixed features exactly where the reference images show them.
- Place every element of the recommended layout (tables, stage, bar, dance floor, stations) to scale.
- Label zones and key furniture; include a scale bar and a north arrow.
- Clean lines on a white background, like a CAD drawing. No people, no photographic textures.",
    },
    ViewSpec {
        label: MAIN_EVENT_SPACE_LABEL,
        prompt_template: "Transform the attached venue photos into a PHOTOREALISTIC wide shot of the main event space, fully set up for the event.

VENUE BLUEPRINT:
{blueprint}

STRICT RULES:
- Preserve the exact original architecture: walls, ceiling, windows, floor, columns and fixed fixtures must match the photos.
- Only add event elements (furniture, decor, lighting, florals, signage) described in the blueprint.
- Lighting: evening at about 19:00, warm ambient light with accent and string lighting switched on.
- Wide-angle eye-level view that shows the whole main space.
- Photographic realism. No illustration style, no text overlays, no UI elements.",
    },
    ViewSpec {
        label: SIDE_VIEW_LABEL,
        prompt_template: "Transform the attached venue photos into a PHOTOREALISTIC angled side view of the venue set up for the event.

VENUE BLUEPRINT:
{blueprint}

STRICT RULES:
- Preserve the exact original architecture shown in the photos; do not invent new walls or windows.
- Lighting: the same evening conditions at about 19:00, warm ambient light with accent lighting on.
- Camera at roughly 45 degrees to the main axis of the room.
- Compose in explicit layers: foreground detail (place settings or decor), midground (guest seating and tables), background (stage, bar or focal wall).
- Photographic realism. No illustration style, no text overlays, no UI elements.",
    },
];

pub fn view_spec(label: &str) -> Option<&'static ViewSpec> {
    VIEW_SPECS.iter().find(|spec| spec.label == label)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderSource {
    Generated,
    Fallback,
}

/// One labeled output image as a self-contained data URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedView {
    pub image_data: String,
    pub description: String,
    pub label: String,
    pub source: RenderSource,
}

impl RenderedView {
    pub fn is_fallback(&self) -> bool {
        self.source == RenderSource::Fallback
    }
}

#[cfg(test)]
mod tests {
    use super::{view_spec, BLUEPRINT_PLACEHOLDER, VIEW_SPECS};

    #[test]
    fn view_specs_are_declared_in_fixed_order() {
        let labels: Vec<&str> = VIEW_SPECS.iter().map(|spec| spec.label).collect();
        assert_eq!(labels, vec!["Floor Plan", "Main Event Space", "Side View"]);
    }

    #[test]
    fn every_template_interpolates_blueprint() {
        for spec in VIEW_SPECS {
            assert!(spec.prompt_template.contains(BLUEPRINT_PLACEHOLDER));
            let instruction = spec.instruction_for("Rooftop terrace, 18m x 9m");
            assert!(instruction.contains("Rooftop terrace, 18m x 9m"));
            assert!(!instruction.contains(BLUEPRINT_PLACEHOLDER));
        }
    }

    #[test]
    fn templates_encode_view_rules() {
        let floor = view_spec("Floor Plan").map(|spec| spec.prompt_template);
        assert!(floor.is_some_and(|text| text.contains("No perspective")));
        let main = view_spec("Main Event Space").map(|spec| spec.prompt_template);
        assert!(main.is_some_and(|text| text.contains("19:00")));
        let side = view_spec("Side View").map(|spec| spec.prompt_template);
        assert!(side.is_some_and(|text| text.contains("foreground") && text.contains("19:00")));
        assert!(view_spec("Aerial").is_none());
    }
}
