//! Editor Integration Tests
//!
//! End-to-end sessions through the public editor API: layer edits reaching
//! the scene, user edits flowing back, layout, history and documents.

use approx::assert_relative_eq;
use tempfile::TempDir;

use atelier::canvas::{Background, CanvasSettings};
use atelier::layers::{LayerContent, LayerPatch, MoveDirection, ShapeKind, TextStyle};
use atelier::template::Template;
use atelier::{Document, Editor, EditorConfig, ImagePlacement, LayerId};

fn editor_with(width: u32, height: u32) -> Editor {
    let config = EditorConfig {
        canvas: CanvasSettings::new(width, height),
        ..Default::default()
    };
    Editor::new(config)
}

fn headline(text: &str, size: f64) -> TextStyle {
    TextStyle {
        text: text.to_string(),
        font_size: size,
        ..Default::default()
    }
}

// === Consistency Tests ===

#[test]
fn test_layers_and_scene_stay_aligned() {
    let mut editor = editor_with(1080, 1080);
    let shape = editor.insert_shape(ShapeKind::Rect, 300.0, 300.0, "#111827");
    let text = editor.insert_text(headline("Sale", 96.0));
    let image = editor
        .insert_image("logo.png", 512.0, 256.0, ImagePlacement::Asset)
        .unwrap();

    assert_eq!(editor.scene().ids(), vec![shape.clone(), text.clone(), image.clone()]);

    editor.move_layer(&image, MoveDirection::Down);
    editor.move_layer(&image, MoveDirection::Down);
    assert_eq!(editor.scene().ids(), vec![image, shape, text]);

    let report = editor.last_sync_report().unwrap();
    assert!(report.reordered);
}

#[test]
fn test_text_patch_reflows_box() {
    let mut editor = editor_with(1080, 1080);
    let id = editor.insert_text(headline("Hi", 40.0));
    let before = editor.scene().get(&id).unwrap().width;

    editor.update_layer(
        &id,
        &LayerPatch {
            text: Some("Hello there".to_string()),
            ..Default::default()
        },
    );
    let after = editor.scene().get(&id).unwrap().width;
    assert!(after > before, "{after} should exceed {before}");
}

#[test]
fn test_tombstone_patch_deletes_like_delete() {
    let mut editor = editor_with(500, 500);
    let id = editor.insert_shape(ShapeKind::Circle, 50.0, 50.0, "#ff0000");
    editor.update_layer(
        &id,
        &LayerPatch {
            should_delete: Some(true),
            ..Default::default()
        },
    );
    assert!(!editor.scene().contains(&id));
    assert!(editor.layer(&id).is_none());
}

#[test]
fn test_drag_flows_back_to_layer() {
    let mut editor = editor_with(1000, 1000);
    let id = editor.insert_text(headline("Drag me", 48.0));

    editor.user_modify(&id, |object| {
        object.left = 640.0;
        object.top = 80.0;
        object.scale_x = 1.5;
        object.scale_y = 1.5;
    });

    let layer = editor.layer(&id).unwrap();
    assert_relative_eq!(layer.geometry.x, 640.0);
    assert_relative_eq!(layer.geometry.y, 80.0);
    assert_relative_eq!(layer.geometry.scale_x, 1.5);
    assert_eq!(editor.flush_user_edits(), 0);
}

#[test]
fn test_shape_fill_patch_survives_drag() {
    let mut editor = editor_with(1000, 1000);
    let id = editor.insert_shape(ShapeKind::Rect, 100.0, 100.0, "#000000");
    let entries = editor.history().past_len();

    assert!(editor.update_layer(
        &id,
        &LayerPatch {
            fill: Some("#ff0000".to_string()),
            ..Default::default()
        },
    ));
    assert_eq!(editor.scene().get(&id).unwrap().fill.as_deref(), Some("#ff0000"));
    assert_eq!(editor.history().past_len(), entries + 1);

    assert!(editor.user_modify(&id, |object| object.left = 42.0));
    match &editor.layer(&id).unwrap().content {
        LayerContent::Shape { fill, .. } => assert_eq!(fill, "#ff0000"),
        other => panic!("unexpected content {other:?}"),
    }

    editor.undo().unwrap();
    editor.undo().unwrap();
    assert_eq!(editor.scene().get(&id).unwrap().fill.as_deref(), Some("#000000"));
}

#[test]
fn test_shape_stroke_patch_reaches_scene() {
    let mut editor = editor_with(1000, 1000);
    let id = editor.insert_shape(ShapeKind::Circle, 80.0, 80.0, "#ffffff");
    editor.update_layer(
        &id,
        &LayerPatch {
            stroke: Some("#222222".to_string()),
            ..Default::default()
        },
    );

    let snapshot = editor.scene().to_snapshot();
    assert!(snapshot.as_value().to_string().contains("#222222"));
    assert_eq!(editor.flush_user_edits(), 0);
}

#[test]
fn test_deleted_object_edits_are_ignored() {
    let mut editor = editor_with(1000, 1000);
    let id = editor.insert_shape(ShapeKind::Rect, 10.0, 10.0, "#000000");
    editor.delete_layer(&id);
    assert!(!editor.user_modify(&id, |object| object.left = 5.0));
}

// === Layout and History Tests ===

#[test]
fn test_layout_then_undo_restores_positions() {
    let mut editor = editor_with(1000, 1000);
    let image = editor
        .insert_image("hero.png", 400.0, 300.0, ImagePlacement::Primary)
        .unwrap();
    let title = editor.insert_text(headline("Big news", 80.0));
    let image_left = editor.scene().get(&image).unwrap().left;

    assert!(editor.apply_layout("z-pattern").is_applied());
    assert_relative_eq!(editor.layer(&title).unwrap().geometry.x, 100.0);
    let right_edge = editor.scene().get(&image).unwrap().bounding_rect().right();
    assert_relative_eq!(right_edge, 900.0, epsilon = 1e-9);

    assert!(editor.undo().unwrap());
    assert_relative_eq!(editor.scene().get(&image).unwrap().left, image_left);
    assert_relative_eq!(editor.layer(&title).unwrap().geometry.x, 100.0);

    assert!(editor.redo().unwrap());
    let right_edge = editor.scene().get(&image).unwrap().bounding_rect().right();
    assert_relative_eq!(right_edge, 900.0, epsilon = 1e-9);
}

#[test]
fn test_new_edit_clears_redo() {
    let mut editor = editor_with(800, 800);
    editor.insert_text(headline("One", 40.0));
    editor.insert_text(headline("Two", 40.0));
    editor.undo().unwrap();
    assert!(editor.history().can_redo());

    editor.insert_shape(ShapeKind::Rect, 10.0, 10.0, "#000000");
    assert!(!editor.history().can_redo());
    assert!(!editor.redo().unwrap());
}

#[test]
fn test_history_depth_from_config() {
    let mut config = EditorConfig::default();
    config.history.max_depth = 3;
    let mut editor = Editor::new(config);

    for i in 0..5 {
        editor.insert_text(headline(&format!("Line {i}"), 30.0));
    }
    assert_eq!(editor.history().past_len(), 3);
    assert_eq!(editor.history().discarded(), 2);
}

#[test]
fn test_undo_delete_reattaches_object() {
    let mut editor = editor_with(1000, 1000);
    let id = editor.insert_shape(ShapeKind::Rect, 10.0, 10.0, "#000000");
    editor.delete_layer(&id);
    editor.undo().unwrap();

    assert!(editor.scene().contains(&id));
    assert!(editor.user_modify(&id, |object| object.left = 42.0));
    assert_relative_eq!(editor.layer(&id).unwrap().geometry.x, 42.0);
}

#[test]
fn test_undo_keeps_layer_names() {
    let mut editor = editor_with(1000, 1000);
    let id = editor.insert_shape(ShapeKind::Rect, 10.0, 10.0, "#000000");
    editor.update_layer(
        &id,
        &LayerPatch {
            name: Some("Backdrop".to_string()),
            ..Default::default()
        },
    );
    editor.insert_text(headline("Top", 20.0));
    editor.undo().unwrap();
    assert_eq!(editor.layer(&id).unwrap().name.as_deref(), Some("Backdrop"));
}

// === Template and Canvas Tests ===

#[test]
fn test_template_session() {
    let mut editor = editor_with(1000, 1000);
    let template = Template::builtin("story-launch").unwrap();
    editor.load_template(&template).unwrap();

    assert_eq!(editor.canvas().format(), "1080x1920");
    assert_eq!(
        editor.canvas().background,
        Background::Solid("#0f172a".to_string())
    );
    assert!(editor
        .layers()
        .iter()
        .all(|l| matches!(l.content, LayerContent::Text(_))));

    let outcome = editor.apply_layout("rule-of-thirds");
    assert!(outcome.is_applied());
    assert!(!outcome.placed().is_empty());
}

#[test]
fn test_palette_background() {
    let mut editor = editor_with(600, 600);
    editor.apply_palette_background(&[[255, 0, 0], [0, 0, 255]]);
    assert!(matches!(editor.canvas().background, Background::Gradient(_)));
    assert_eq!(editor.scene().background(), &editor.canvas().background);
}

#[test]
fn test_undo_first_format_change_restores_starting_canvas() {
    let mut editor = editor_with(1000, 1000);
    editor.set_format("1080x1920").unwrap();

    assert!(editor.undo().unwrap());
    assert_eq!(editor.canvas().format(), "1000x1000");
    assert_eq!(editor.scene().height(), 1000);
    assert!(!editor.undo().unwrap());
}

// === Document Tests ===

#[test]
fn test_reopened_document_keeps_starting_canvas() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("creative.json");

    let mut editor = editor_with(1000, 1000);
    editor.set_format("1200x628").unwrap();
    editor.to_document().save(&path).unwrap();

    let config = EditorConfig {
        canvas: CanvasSettings::new(500, 500),
        ..Default::default()
    };
    let mut reopened = Editor::from_document(config, Document::load(&path).unwrap()).unwrap();
    assert_eq!(reopened.canvas().format(), "1200x628");
    assert!(reopened.undo().unwrap());
    assert_eq!(reopened.canvas().format(), "1000x1000");
}

#[test]
fn test_document_round_trip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("creative.json");

    let mut editor = editor_with(1080, 1080);
    let text = editor.insert_text(headline("Persist me", 64.0));
    editor.insert_shape(ShapeKind::Rect, 100.0, 100.0, "#000000");
    editor.to_document().save(&path).unwrap();

    let mut reopened = Editor::from_document(EditorConfig::default(), Document::load(&path).unwrap()).unwrap();
    assert_eq!(reopened.layers(), editor.layers());
    assert_eq!(reopened.history().past_len(), 2);
    assert_eq!(reopened.next_layer_id(), editor.next_layer_id());

    reopened.update_layer(
        &text,
        &LayerPatch {
            visible: Some(false),
            ..Default::default()
        },
    );
    assert!(!reopened.scene().get(&text).unwrap().visible);

    reopened.user_modify(&text, |object| object.top = 900.0);
    assert_relative_eq!(reopened.layer(&text).unwrap().geometry.y, 900.0);

    assert!(reopened.undo().unwrap());
    assert!(reopened.undo().unwrap());
    assert!(reopened.scene().get(&text).unwrap().visible);

    let fresh = reopened.insert_text(headline("New", 20.0));
    assert_ne!(fresh, LayerId::from("text-1"));
}
