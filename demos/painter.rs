//! Paint a stored background in a window.
//!
//! `cargo run --example painter -- <games dir> <game> <background id>`
//!
//! Left click paints the palette selection, right click erases, Tab cycles
//! the active layer and V toggles its visibility. Every stroke is saved
//! through the same repository calls the HTTP API uses.

use std::sync::Arc;

use anyhow::{bail, Context};
use macroquad::prelude::*;
use tile_studio::view::BackgroundView;
use tile_studio::{render, Background, FsStore, Studio, StudioConfig, EMPTY_TILE};

const SCALE: f32 = 2.0;

fn window_conf() -> Conf {
    Conf {
        window_title: "Tile Painter".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run().await {
        eprintln!("painter: {e:#}");
    }
}

async fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let [dir, game, bg_id] = args.as_slice() else {
        bail!("usage: painter <games dir> <game> <background id>");
    };

    let studio = Studio::new(Arc::new(FsStore::new(dir)), StudioConfig::default());
    let project = studio.project(game);
    let doc = project.document().with_context(|| format!("loading game {game}"))?;
    let mut bg: Background = doc.background(bg_id)?.clone();
    let tileset = doc.tileset(&bg.tileset_id)?.clone();
    let image = doc.image(&tileset.image_id)?;
    let source = render::decode_rgba(&project.read_asset(tile_studio::AssetFolder::Images, &image.filename)?)
        .with_context(|| format!("decoding {}", image.filename))?;
    let view = BackgroundView::new(tileset, &source);

    let mut selected = 1u32;
    let mut active = 0usize;
    let canvas = vec2(20.0, 60.0);

    loop {
        clear_background(DARKGRAY);
        let palette = vec2(screen_width() - source.width() as f32 * SCALE - 20.0, 60.0);
        let mouse = Vec2::from(mouse_position());

        view.draw(&bg, canvas, SCALE);
        view.draw_grid(&bg, canvas, SCALE, Color::new(1.0, 1.0, 1.0, 0.15));
        let hovered = view.draw_palette(palette, SCALE, mouse);

        if is_key_pressed(KeyCode::Tab) {
            active = (active + 1) % bg.layers.len();
        }
        let layer_id = bg.layers[active].id.clone();
        if is_key_pressed(KeyCode::V) {
            bg = project.toggle_layer_visibility(&bg.id, &layer_id)?;
        }

        let stroke = if is_mouse_button_down(MouseButton::Left) {
            Some(selected)
        } else if is_mouse_button_down(MouseButton::Right) {
            Some(EMPTY_TILE)
        } else {
            None
        };
        match (stroke, hovered) {
            (Some(_), Some(tile)) if is_mouse_button_pressed(MouseButton::Left) => selected = tile,
            (Some(tile), None) => {
                let (x, y) = view.cell_at(canvas, SCALE, mouse);
                bg = project.paint_tile(&bg.id, &layer_id, x, y, tile)?;
            }
            _ => {}
        }

        let layer = &bg.layers[active];
        draw_text(
            &format!(
                "{}  layer {} '{}'{}  tile {selected}",
                bg.name,
                active + 1,
                layer.name,
                if layer.visible { "" } else { " (hidden)" }
            ),
            20.0,
            36.0,
            28.0,
            WHITE,
        );

        next_frame().await;
    }
}
