mod audio_manager;
mod process_events;

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use raylib::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use audio_manager::AudioManager;
use process_events::process_events;
use tile_raycaster::config::Settings;
use tile_raycaster::core::interaction::{all_npcs_dead, npc_action, resolve_shot};
use tile_raycaster::core::maze::load_maze;
use tile_raycaster::core::player::{Player, is_free_with_radius};
use tile_raycaster::core::sprite::{default_population, stagger_animations};
use tile_raycaster::render::framebuffer::Framebuffer;
use tile_raycaster::render::render3d::render_frame;
use tile_raycaster::render::textures::TextureManager;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "fatal");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let settings_path = std::env::args().nth(1).map(PathBuf::from);
    let settings = Settings::load(settings_path.as_deref())?;
    let proj = settings.projection();
    info!(width = settings.width, height = settings.height, rays = settings.num_rays, "settings loaded");

    let maze = load_maze(Path::new(&settings.map_path), settings.tile)?;
    let assets = Path::new(&settings.assets_dir);

    let mut sprites = default_population(settings.tile);
    stagger_animations(&mut sprites, &mut rand::thread_rng());
    let mut player = Player::from_settings(&settings);

    let (mut window, thread) = raylib::init()
        .size(settings.width as i32, settings.height as i32)
        .title("Tile Raycaster")
        .build();
    window.set_target_fps(settings.fps);
    window.disable_cursor();

    let textures = TextureManager::load(assets);
    let mut framebuffer = Framebuffer::new(settings.width, settings.height);
    let blank = Image::gen_image_color(settings.width as i32, settings.height as i32, Color::BLACK);
    let mut screen = window.load_texture_from_image(&thread, &blank).map_err(|e| e.to_string())?;

    let mut audio = AudioManager::new();
    if let Some(a) = audio.as_mut() {
        a.load_sfx(assets);
        a.play_music_loop(assets, "theme");
    }

    let mut won = false;
    while !window.window_should_close() {
        let input = process_events(&window);
        if !won {
            player.update(&input, |x, y, r| is_free_with_radius(&maze, &sprites, x, y, r));
        }

        let view = player.viewpoint();
        let stats = render_frame(&mut framebuffer, &maze, &mut sprites, &view, &proj, &textures);

        if player.take_shot() {
            if let Some(a) = &audio {
                a.play_shot();
            }
            if let Some(outcome) = resolve_shot(&mut sprites, &view, &maze, proj.center_ray, proj.scale) {
                if outcome.killed && outcome.npc {
                    if let Some(a) = &audio {
                        a.play_pain();
                    }
                }
            }
        }
        npc_action(&mut sprites, &view, &maze);

        if !won && all_npcs_dead(&sprites) {
            won = true;
            info!("all NPCs defeated");
            if let Some(a) = audio.as_mut() {
                a.switch_music(assets, "win");
            }
        }

        framebuffer.upload_to_texture(&mut screen);
        let fps = window.get_fps();
        let mut d = window.begin_drawing(&thread);
        d.clear_background(Color::BLACK);
        d.draw_texture(&screen, 0, 0, Color::WHITE);

        let (cx, cy) = (settings.width as i32 / 2, settings.height as i32 / 2);
        d.draw_line(cx - 10, cy, cx + 10, cy, Color::RAYWHITE);
        d.draw_line(cx, cy - 10, cx, cy + 10, Color::RAYWHITE);
        if player.is_shooting() {
            let impact = stats.impact();
            let radius = (impact.projected_height / 8.0).clamp(2.0, 40.0);
            d.draw_circle(cx, cy, radius, Color::new(255, 200, 80, 160));
        }
        d.draw_text(&format!("{fps}"), 10, 10, 30, Color::ORANGE);
        if won {
            d.draw_text("YOU WIN", cx - 120, cy - 40, 60, Color::GOLD);
        }
    }
    Ok(())
}
