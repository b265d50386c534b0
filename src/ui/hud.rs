use bevy::prelude::*;
use crate::config::GameConfig;
use crate::islands::IslandMap;
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// MARKER COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component)]
pub struct HudRoot;

#[derive(Component)]
pub struct HudScoreText;

#[derive(Component)]
pub struct HudIslandText;

/// Centre-screen message for the non-playing states.
#[derive(Component)]
pub struct HudBanner;

// ═══════════════════════════════════════════════════════════════════════
// SPAWN HUD
// ═══════════════════════════════════════════════════════════════════════

pub fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((
            HudRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::SpaceBetween,
                align_items: AlignItems::Center,
                ..default()
            },
            PickingBehavior::IGNORE,
        ))
        .with_children(|parent| {
            // Spacer under the beat track
            parent.spawn((
                Node {
                    height: Val::Px(96.0),
                    ..default()
                },
                PickingBehavior::IGNORE,
            ));

            parent.spawn((
                HudBanner,
                Text::new(""),
                TextFont {
                    font_size: 36.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                PickingBehavior::IGNORE,
            ));

            // ─── BOTTOM BAR ───
            parent
                .spawn((
                    Node {
                        width: Val::Percent(100.0),
                        height: Val::Px(40.0),
                        flex_direction: FlexDirection::Row,
                        justify_content: JustifyContent::SpaceBetween,
                        align_items: AlignItems::Center,
                        padding: UiRect::axes(Val::Px(12.0), Val::Px(4.0)),
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
                    PickingBehavior::IGNORE,
                ))
                .with_children(|bar| {
                    bar.spawn((
                        HudScoreText,
                        Text::new("Score 0"),
                        TextFont {
                            font_size: 20.0,
                            ..default()
                        },
                        TextColor(Color::srgb(1.0, 0.85, 0.3)),
                    ));
                    bar.spawn((
                        HudIslandText,
                        Text::new(""),
                        TextFont {
                            font_size: 20.0,
                            ..default()
                        },
                        TextColor(Color::srgb(0.8, 0.9, 1.0)),
                    ));
                });
        });
}

// ═══════════════════════════════════════════════════════════════════════
// UPDATE SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

pub fn update_score_text(
    mut events: EventReader<ScoreChangedEvent>,
    config: Res<GameConfig>,
    mut query: Query<&mut Text, With<HudScoreText>>,
) {
    let Some(latest) = events.read().last() else {
        return;
    };
    for mut text in query.iter_mut() {
        **text = format!("Score {} / {}", latest.score, config.win_score);
    }
}

pub fn update_island_text(
    islands: Res<IslandMap>,
    mut query: Query<&mut Text, With<HudIslandText>>,
) {
    if !islands.is_changed() {
        return;
    }
    let standing = islands.iter().filter(|i| i.visible).count();
    for mut text in query.iter_mut() {
        **text = format!("Islands {}/{}", standing, islands.len());
    }
}

pub fn update_banner(
    state: Res<State<GameState>>,
    mut query: Query<&mut Text, With<HudBanner>>,
) {
    if !state.is_changed() {
        return;
    }
    let message = match state.get() {
        GameState::BeforeGame => "Press SPACE to start",
        GameState::InGame => "",
        GameState::Win => "Harvest complete! SPACE to play again",
        GameState::Lose => "Every island is lost",
    };
    for mut text in query.iter_mut() {
        **text = message.to_string();
    }
}
