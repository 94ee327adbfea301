//! Round resolution and the ends of an encounter.

use super::damage::technique_amount;
use super::guardians::{guardians_for_location, hero_combatant};
use super::types::{ActiveStatusEffect, Combat, CombatOutcome, CombatSide, Combatant};
use crate::content::{
    ContentRegistry, GameStat, Rarity, SkillTechnique, StatusEffectContent, StatusEffectKind,
    TargettingType, TechniqueScalar, TechniqueTarget,
};
use crate::core::constants::{SOUL_ESSENCE_PER_ENCOUNTER_LEVEL, XP_PER_ENCOUNTER_LEVEL};
use crate::core::game_state::{GameState, NotificationKind};
use crate::currency::{currency_gain, GameCurrency};
use crate::error::{GameError, Result};
use crate::hero::party_gain_xp;
use crate::items::EquipmentSkill;
use crate::rng::{random_choice, random_sample, random_uuid, succeeds_chance};
use crate::world::{location_claim, location_grant_loot, Position};
use rand::Rng;

/// The attack every combatant can fall back on.
pub fn basic_attack() -> EquipmentSkill {
    EquipmentSkill {
        id: "basic-attack".to_string(),
        content_id: "basic-attack".to_string(),
        name: "Attack".to_string(),
        rarity: Rarity::Common,
        drop_level: 0,
        techniques: vec![SkillTechnique {
            targets: 1,
            target_type: TechniqueTarget::Enemy,
            elements: vec![],
            scalars: vec![TechniqueScalar {
                stat: GameStat::Force,
                multiplier: 1.0,
            }],
            heals: false,
            status_effects: vec![],
            combat_message: "{combatant} strikes {target} for {amount} damage.".to_string(),
        }],
    }
}

/// Starts an encounter with the guardians of a location. Returns `false`
/// when none of its guardians could be built, leaving no combat behind.
pub fn combat_start<R: Rng>(
    state: &mut GameState,
    content: &ContentRegistry,
    location_id: &str,
    rng: &mut R,
) -> Result<bool> {
    let location = state
        .world
        .locations
        .get(location_id)
        .ok_or_else(|| GameError::not_found("location", location_id))?;
    let guardians = guardians_for_location(&location.guardian_ids, content, location.encounter_level, rng);
    if guardians.is_empty() {
        return Ok(false);
    }
    let heroes: Vec<Combatant> = state
        .hero
        .heroes
        .iter()
        .filter(|h| h.is_alive())
        .map(hero_combatant)
        .collect();
    if heroes.is_empty() {
        return Err(GameError::Requirement("no hero is able to fight".to_string()));
    }

    let mut combat = Combat {
        id: random_uuid(rng).to_string(),
        location_id: location.id.clone(),
        location_name: location.name.clone(),
        location: location.position(),
        rounds: 0,
        heroes,
        guardians,
        log: Vec::new(),
    };
    combat.push_log(format!(
        "The party confronts the guardians of {}.",
        combat.location_name
    ));
    tracing::debug!(
        "combat {} started at {} against {} guardians",
        combat.id,
        combat.location_id,
        combat.guardians.len()
    );
    state.hero.status_message = format!("Fighting at {}", combat.location_name);
    state.hero.combat = Some(combat);
    Ok(true)
}

/// Guardians first, then heroes, stably sorted by descending speed.
fn turn_order(combat: &Combat) -> Vec<(CombatSide, usize)> {
    let mut order: Vec<(CombatSide, usize, f64)> = combat
        .guardians
        .iter()
        .enumerate()
        .map(|(i, c)| (CombatSide::Guardian, i, c.effective_stat(GameStat::Speed)))
        .chain(
            combat
                .heroes
                .iter()
                .enumerate()
                .map(|(i, c)| (CombatSide::Hero, i, c.effective_stat(GameStat::Speed))),
        )
        .collect();
    order.sort_by(|a, b| b.2.total_cmp(&a.2));
    order.into_iter().map(|(side, i, _)| (side, i)).collect()
}

/// Ticks the actor's status effects. Returns true if the actor loses the turn.
fn tick_status_effects(combat: &mut Combat, side: CombatSide, index: usize) -> bool {
    let mut lines = Vec::new();
    let actor = &mut combat.side_mut(side)[index];
    let stunned = actor.is_stunned();
    let max_hp = actor.max_hp;

    for effect in actor.status_effects.iter_mut() {
        match effect.kind {
            StatusEffectKind::DamageOverTime => {
                let amount = effect.value * max_hp;
                actor.hp = (actor.hp - amount).max(0.0);
                lines.push(format!("{} suffers {amount:.0} from {}.", actor.name, effect.name));
            }
            StatusEffectKind::HealOverTime => {
                let amount = effect.value * max_hp;
                actor.hp = (actor.hp + amount).min(max_hp);
                lines.push(format!("{} recovers {amount:.0} from {}.", actor.name, effect.name));
            }
            _ => {}
        }
        effect.turns_left = effect.turns_left.saturating_sub(1);
    }
    actor.status_effects.retain(|e| e.turns_left > 0);
    if stunned && actor.is_alive() {
        lines.push(format!("{} is stunned.", actor.name));
    }
    if !actor.is_alive() {
        lines.push(format!("{} falls.", actor.name));
    }
    let skip = stunned || !actor.is_alive();
    for line in lines {
        combat.push_log(line);
    }
    skip
}

/// Living indices a technique may hit, and the side they are on.
fn legal_targets(
    combat: &Combat,
    side: CombatSide,
    index: usize,
    target: TechniqueTarget,
) -> (CombatSide, Vec<usize>) {
    let living = |s: CombatSide| -> Vec<usize> {
        combat
            .side(s)
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_alive())
            .map(|(i, _)| i)
            .collect()
    };
    match target {
        TechniqueTarget::Enemy => (side.opponent(), living(side.opponent())),
        TechniqueTarget::Ally => (side, living(side)),
        TechniqueTarget::Itself => {
            let alive = combat.side(side).get(index).is_some_and(Combatant::is_alive);
            (side, if alive { vec![index] } else { vec![] })
        }
    }
}

fn skill_is_applicable(combat: &Combat, side: CombatSide, index: usize, skill: &EquipmentSkill) -> bool {
    !skill.techniques.is_empty()
        && skill
            .techniques
            .iter()
            .all(|t| !legal_targets(combat, side, index, t.target_type).1.is_empty())
}

fn choose_targets<R: Rng>(
    combat: &Combat,
    target_side: CombatSide,
    candidates: Vec<usize>,
    technique: &SkillTechnique,
    targetting: TargettingType,
    rng: &mut R,
) -> Vec<usize> {
    let count = (technique.targets.max(1) as usize).min(candidates.len());
    if technique.target_type != TechniqueTarget::Enemy || targetting == TargettingType::Random {
        return random_sample(&candidates, count, rng);
    }
    let pool = combat.side(target_side);
    let mut sorted = candidates;
    sorted.sort_by(|a, b| pool[*a].hp.total_cmp(&pool[*b].hp));
    if targetting == TargettingType::Strongest {
        sorted.reverse();
    }
    sorted.truncate(count);
    sorted
}

fn render_message(template: &str, actor: &str, target: &str, amount: f64, heals: bool) -> String {
    if template.is_empty() {
        return if heals {
            format!("{actor} heals {target} for {amount:.0}.")
        } else {
            format!("{actor} hits {target} for {amount:.0} damage.")
        };
    }
    template
        .replace("{combatant}", actor)
        .replace("{target}", target)
        .replace("{amount}", &format!("{amount:.0}"))
}

fn apply_status_effects<R: Rng>(
    combat: &mut Combat,
    content: &ContentRegistry,
    technique: &SkillTechnique,
    target_side: CombatSide,
    target_index: usize,
    rng: &mut R,
) {
    for applied in &technique.status_effects {
        let Some(definition) = content.get_entry::<StatusEffectContent>(&applied.status_effect_id) else {
            tracing::warn!("unknown status effect {}", applied.status_effect_id);
            continue;
        };
        if !succeeds_chance(applied.chance, rng) {
            continue;
        }
        let target = &mut combat.side_mut(target_side)[target_index];
        if !target.is_alive() {
            return;
        }
        target
            .status_effects
            .retain(|e| e.status_effect_id != definition.id);
        target.status_effects.push(ActiveStatusEffect {
            status_effect_id: definition.id.clone(),
            name: definition.name.clone(),
            kind: definition.kind,
            value: definition.value,
            stat: definition.stat,
            turns_left: applied.duration.max(1),
        });
        let line = format!("{} is afflicted by {}.", target.name, definition.name);
        combat.push_log(line);
    }
}

fn apply_technique<R: Rng>(
    combat: &mut Combat,
    content: &ContentRegistry,
    side: CombatSide,
    index: usize,
    technique: &SkillTechnique,
    rng: &mut R,
) {
    let (target_side, candidates) = legal_targets(combat, side, index, technique.target_type);
    if candidates.is_empty() {
        return;
    }
    let attacker = combat.side(side)[index].clone();
    let chosen = choose_targets(combat, target_side, candidates, technique, attacker.targetting_type, rng);

    for target_index in chosen {
        let amount = technique_amount(technique, &attacker, &combat.side(target_side)[target_index], combat.rounds);
        let target = &mut combat.side_mut(target_side)[target_index];
        if technique.heals {
            target.heal(amount);
        } else {
            target.take_damage(amount);
        }
        let fell = !target.is_alive();
        let line = render_message(
            &technique.combat_message,
            &attacker.name,
            &target.name,
            amount,
            technique.heals,
        );
        let target_name = target.name.clone();
        combat.push_log(line);
        if fell {
            combat.push_log(format!("{target_name} falls."));
            continue;
        }
        apply_status_effects(combat, content, technique, target_side, target_index, rng);
    }
}

/// Plays one full round. Stops as soon as one side is wiped out.
pub fn combat_round<R: Rng>(combat: &mut Combat, content: &ContentRegistry, rng: &mut R) -> CombatOutcome {
    for (side, index) in turn_order(combat) {
        if combat.outcome() != CombatOutcome::Ongoing {
            break;
        }
        if !combat.side(side)[index].is_alive() {
            continue;
        }
        if tick_status_effects(combat, side, index) {
            continue;
        }

        let fallback = basic_attack();
        let options: Vec<&EquipmentSkill> = combat.side(side)[index]
            .skills
            .iter()
            .chain(std::iter::once(&fallback))
            .filter(|s| skill_is_applicable(combat, side, index, s))
            .collect();
        let Some(skill) = random_choice(&options, rng).map(|s| (*s).clone()) else {
            continue;
        };

        for technique in &skill.techniques {
            apply_technique(combat, content, side, index, technique, rng);
            if combat.outcome() != CombatOutcome::Ongoing {
                break;
            }
        }
    }
    combat.rounds += 1;
    combat.outcome()
}

fn sync_hero_hp(state: &mut GameState, combat: &Combat) {
    for fighter in &combat.heroes {
        if let Some(hero) = state.hero.heroes.iter_mut().find(|h| h.id == fighter.id) {
            hero.hp = fighter.hp.clamp(0.0, hero.max_hp());
        }
    }
}

/// Sends the party home and drops whatever it was doing.
fn retreat_home(state: &mut GameState) -> Position {
    let home = state.world.home;
    state.hero.position = home;
    state.hero.travel = None;
    state.hero.exploring = None;
    home
}

fn combat_victory<R: Rng>(
    state: &mut GameState,
    content: &ContentRegistry,
    combat: Combat,
    now: u64,
    rng: &mut R,
) {
    let level = state
        .world
        .locations
        .get(&combat.location_id)
        .map(|l| l.encounter_level)
        .unwrap_or(1)
        .max(1);
    let xp = XP_PER_ENCOUNTER_LEVEL * level as u64 * combat.guardians.len() as u64;
    party_gain_xp(state, content, xp);
    currency_gain(
        state,
        GameCurrency::SoulEssence,
        SOUL_ESSENCE_PER_ENCOUNTER_LEVEL * level as f64,
    );
    let loot = location_grant_loot(state, content, &combat.location_id, rng);
    if let Err(e) = location_claim(state, &combat.location_id, now) {
        tracing::warn!("victory at {} but claim failed: {e}", combat.location_id);
    }
    state.hero.exploring = None;

    tracing::info!(
        "won combat {} at {} after {} rounds",
        combat.id,
        combat.location_id,
        combat.rounds
    );
    if !loot.is_empty() {
        state.notify(NotificationKind::Success, format!("Found: {}", loot.join(", ")));
    }
    state.hero.status_message = format!("Victorious at {}", combat.location_name);
}

fn combat_defeat(state: &mut GameState, combat: Combat) {
    let safe = retreat_home(state);
    let haven = state
        .world
        .location_at(safe)
        .map(|l| l.name.clone())
        .unwrap_or_else(|| safe.key());
    tracing::info!("lost combat {} at {}", combat.id, combat.location_id);
    state.notify(
        NotificationKind::Warning,
        format!(
            "The party was defeated at {} and retreated to {haven}.",
            combat.location_name
        ),
    );
    state.hero.status_message = format!("Defeated at {}", combat.location_name);
}

/// Plays one round of the active combat and resolves it if it ended.
pub fn combat_process<R: Rng>(
    state: &mut GameState,
    content: &ContentRegistry,
    now: u64,
    rng: &mut R,
) -> CombatOutcome {
    let Some(mut combat) = state.hero.combat.take() else {
        return CombatOutcome::Ongoing;
    };
    let outcome = combat_round(&mut combat, content, rng);
    sync_hero_hp(state, &combat);
    match outcome {
        CombatOutcome::Ongoing => state.hero.combat = Some(combat),
        CombatOutcome::Victory => combat_victory(state, content, combat, now, rng),
        CombatOutcome::Defeat => combat_defeat(state, combat),
    }
    outcome
}

/// Abandons the active combat. No rewards; the party goes home.
pub fn combat_flee(state: &mut GameState) -> Result<()> {
    let mut combat = state
        .hero
        .combat
        .take()
        .ok_or_else(|| GameError::not_found("combat", "active"))?;
    combat.push_log("The party flees.");
    sync_hero_hp(state, &combat);
    retreat_home(state);
    tracing::info!("fled combat {} at {}", combat.id, combat.location_id);
    state.notify(
        NotificationKind::Info,
        format!("The party fled from {}.", combat.location_name),
    );
    state.hero.status_message = format!("Fled from {}", combat.location_name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ElementBlock, StatBlock};
    use crate::rng::seeded_rng;

    fn fighter(id: &str, side: CombatSide, force: f64, health: f64, speed: f64) -> Combatant {
        Combatant {
            id: id.to_string(),
            name: id.to_string(),
            side,
            hp: health,
            max_hp: health,
            stats: StatBlock::new(0.0, force, health, speed),
            affinity: ElementBlock::default(),
            resistance: ElementBlock::default(),
            skills: vec![],
            targetting_type: TargettingType::Random,
            status_effects: vec![],
        }
    }

    fn combat(heroes: Vec<Combatant>, guardians: Vec<Combatant>) -> Combat {
        Combat {
            id: "test".to_string(),
            location_id: "1,0".to_string(),
            location_name: "Den".to_string(),
            location: Position::new(1, 0),
            rounds: 0,
            heroes,
            guardians,
            log: vec![],
        }
    }

    #[test]
    fn test_turn_order_is_stable_by_speed() {
        let c = combat(
            vec![
                fighter("h-fast", CombatSide::Hero, 1.0, 10.0, 9.0),
                fighter("h-tie", CombatSide::Hero, 1.0, 10.0, 5.0),
            ],
            vec![
                fighter("g-tie", CombatSide::Guardian, 1.0, 10.0, 5.0),
                fighter("g-slow", CombatSide::Guardian, 1.0, 10.0, 1.0),
            ],
        );
        let order: Vec<&str> = turn_order(&c)
            .into_iter()
            .map(|(side, i)| c.side(side)[i].id.as_str())
            .collect();
        assert_eq!(order, vec!["h-fast", "g-tie", "h-tie", "g-slow"]);
    }

    #[test]
    fn test_strong_party_wins() {
        let content = ContentRegistry::bundled().unwrap();
        let mut c = combat(
            vec![fighter("hero", CombatSide::Hero, 50.0, 100.0, 10.0)],
            vec![fighter("rat", CombatSide::Guardian, 1.0, 20.0, 1.0)],
        );
        let outcome = combat_round(&mut c, &content, &mut seeded_rng("win"));
        assert_eq!(outcome, CombatOutcome::Victory);
        assert_eq!(c.rounds, 1);
    }

    #[test]
    fn test_combat_stops_mid_round_once_decided() {
        let content = ContentRegistry::bundled().unwrap();
        let mut c = combat(
            vec![fighter("hero", CombatSide::Hero, 1.0, 5.0, 1.0)],
            vec![
                fighter("ogre", CombatSide::Guardian, 100.0, 50.0, 10.0),
                fighter("ogre2", CombatSide::Guardian, 100.0, 50.0, 9.0),
            ],
        );
        let outcome = combat_round(&mut c, &content, &mut seeded_rng("lose"));
        assert_eq!(outcome, CombatOutcome::Defeat);
        // the second ogre never acted
        assert_eq!(c.log.iter().filter(|l| l.contains("strikes")).count(), 1);
    }

    #[test]
    fn test_stalemate_eventually_resolves() {
        let content = ContentRegistry::bundled().unwrap();
        let mut c = combat(
            vec![fighter("hero", CombatSide::Hero, 0.1, 200.0, 2.0)],
            vec![fighter("wall", CombatSide::Guardian, 0.1, 200.0, 1.0)],
        );
        let mut rng = seeded_rng("deadlock");
        let mut outcome = CombatOutcome::Ongoing;
        for _ in 0..5000 {
            outcome = combat_round(&mut c, &content, &mut rng);
            if outcome != CombatOutcome::Ongoing {
                break;
            }
        }
        assert_ne!(outcome, CombatOutcome::Ongoing);
    }

    #[test]
    fn test_stun_skips_turn_and_expires() {
        let content = ContentRegistry::bundled().unwrap();
        let mut hero = fighter("hero", CombatSide::Hero, 1.0, 100.0, 10.0);
        hero.status_effects.push(ActiveStatusEffect {
            status_effect_id: "stun".to_string(),
            name: "Stun".to_string(),
            kind: StatusEffectKind::Stun,
            value: 0.0,
            stat: None,
            turns_left: 1,
        });
        let mut c = combat(vec![hero], vec![fighter("g", CombatSide::Guardian, 0.0, 100.0, 1.0)]);
        combat_round(&mut c, &content, &mut seeded_rng("stun"));
        assert!(c.log.iter().any(|l| l == "hero is stunned."));
        assert!(c.heroes[0].status_effects.is_empty());
        assert_eq!(c.guardians[0].hp, 100.0);
    }

    #[test]
    fn test_damage_over_time_ticks() {
        let content = ContentRegistry::bundled().unwrap();
        let mut guardian = fighter("g", CombatSide::Guardian, 0.0, 100.0, 1.0);
        guardian.status_effects.push(ActiveStatusEffect {
            status_effect_id: "burn".to_string(),
            name: "Burn".to_string(),
            kind: StatusEffectKind::DamageOverTime,
            value: 0.1,
            stat: None,
            turns_left: 3,
        });
        let mut c = combat(vec![fighter("h", CombatSide::Hero, 0.0, 100.0, 5.0)], vec![guardian]);
        combat_round(&mut c, &content, &mut seeded_rng("burn"));
        assert_eq!(c.guardians[0].hp, 90.0);
        assert_eq!(c.guardians[0].status_effects[0].turns_left, 2);
    }

    #[test]
    fn test_weakest_targetting_picks_lowest_hp() {
        let mut hero = fighter("h", CombatSide::Hero, 5.0, 100.0, 5.0);
        hero.targetting_type = TargettingType::Weakest;
        let mut hurt = fighter("hurt", CombatSide::Guardian, 0.0, 50.0, 1.0);
        hurt.hp = 10.0;
        let c = combat(
            vec![hero],
            vec![fighter("full", CombatSide::Guardian, 0.0, 50.0, 1.0), hurt],
        );
        let technique = &basic_attack().techniques[0];
        let picked = choose_targets(
            &c,
            CombatSide::Guardian,
            vec![0, 1],
            technique,
            TargettingType::Weakest,
            &mut seeded_rng("weak"),
        );
        assert_eq!(picked, vec![1]);
        let picked = choose_targets(
            &c,
            CombatSide::Guardian,
            vec![0, 1],
            technique,
            TargettingType::Strongest,
            &mut seeded_rng("strong"),
        );
        assert_eq!(picked, vec![0]);
    }

    #[test]
    fn test_message_template_substitution() {
        let line = render_message("{combatant} bites {target} ({amount})", "Wolf", "Ayla", 7.4, false);
        assert_eq!(line, "Wolf bites Ayla (7)");
    }

    #[test]
    fn test_flee_without_combat_is_error() {
        let mut state = GameState::blank();
        assert!(combat_flee(&mut state).is_err());
    }
}
