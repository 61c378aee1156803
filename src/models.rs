use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::dates::DateKey;
use crate::gate::{GateError, PinGate};
use crate::priority::{Prioritized, cycle_priority, sort_by_priority};

/// Highest star rating a to-do can carry
pub const MAX_STARS: u8 = 3;

/// Record identifier. New records get a UUID v4; older stores may hold numeric ids,
/// which are accepted and kept in their decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.trim().to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => ItemId(s),
            RawId::Number(n) => ItemId(n.to_string()),
        })
    }
}

/// Stars are clamped into 0..=3; anything non-numeric counts as 0.
fn deserialize_stars<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value.as_f64() {
        Some(n) if n.is_finite() => n.clamp(0.0, MAX_STARS as f64) as u8,
        _ => 0,
    })
}

/// Priorities outside 1..=3 are treated as missing.
fn deserialize_prio<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_u64().and_then(normalize_prio_u64))
}

fn normalize_prio_u64(p: u64) -> Option<u8> {
    (1..=3).contains(&p).then_some(p as u8)
}

fn normalize_prio(prio: Option<u8>) -> Option<u8> {
    prio.and_then(|p| normalize_prio_u64(p as u64))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: ItemId,
    pub text: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, deserialize_with = "deserialize_stars")]
    pub stars: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalItem {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, deserialize_with = "deserialize_prio", skip_serializing_if = "Option::is_none")]
    pub prio: Option<u8>,
}

impl Prioritized for GoalItem {
    fn prio(&self) -> Option<u8> {
        self.prio
    }
}

/// An entry on the "things to avoid" list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvoidItem {
    pub id: ItemId,
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_prio", skip_serializing_if = "Option::is_none")]
    pub prio: Option<u8>,
}

impl Prioritized for AvoidItem {
    fn prio(&self) -> Option<u8> {
        self.prio
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardPost {
    pub id: ItemId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub timestamp: String,
}

/// To-do items bucketed by day.
///
/// Every mutation returns a new snapshot and leaves `self` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoBook {
    days: BTreeMap<DateKey, Vec<TodoItem>>,
}

impl TodoBook {
    pub fn items_on(&self, date: DateKey) -> &[TodoItem] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append a to-do. Blank text is ignored.
    pub fn add(&self, date: DateKey, text: &str, stars: u8) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return self.clone();
        }
        let mut next = self.clone();
        next.days.entry(date).or_default().push(TodoItem {
            id: ItemId::generate(),
            text: text.to_string(),
            done: false,
            stars: stars.min(MAX_STARS),
        });
        next
    }

    pub fn toggle(&self, date: DateKey, id: &ItemId) -> Self {
        self.update(date, id, |item| item.done = !item.done)
    }

    pub fn set_stars(&self, date: DateKey, id: &ItemId, stars: u8) -> Self {
        self.update(date, id, |item| item.stars = stars.min(MAX_STARS))
    }

    /// Remove a to-do. The day's bucket stays, possibly empty.
    pub fn remove(&self, date: DateKey, id: &ItemId) -> Self {
        let mut next = self.clone();
        if let Some(items) = next.days.get_mut(&date) {
            items.retain(|item| &item.id != id);
        }
        next
    }

    fn update(&self, date: DateKey, id: &ItemId, f: impl FnOnce(&mut TodoItem)) -> Self {
        let mut next = self.clone();
        if let Some(item) = next
            .days
            .get_mut(&date)
            .and_then(|items| items.iter_mut().find(|item| &item.id == id))
        {
            f(item);
        }
        next
    }
}

/// Goals bucketed by year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalBook {
    years: BTreeMap<i32, Vec<GoalItem>>,
}

impl GoalBook {
    pub fn goals_in(&self, year: i32) -> &[GoalItem] {
        self.years.get(&year).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Goals for a year in display order
    pub fn sorted(&self, year: i32) -> Vec<GoalItem> {
        sort_by_priority(self.goals_in(year))
    }

    pub fn add(&self, year: i32, title: &str, prio: Option<u8>) -> Self {
        let title = title.trim();
        if title.is_empty() {
            return self.clone();
        }
        let mut next = self.clone();
        next.years.entry(year).or_default().push(GoalItem {
            id: ItemId::generate(),
            title: title.to_string(),
            done: false,
            prio: normalize_prio(prio),
        });
        next
    }

    pub fn toggle(&self, year: i32, id: &ItemId) -> Self {
        self.update(year, id, |goal| goal.done = !goal.done)
    }

    pub fn set_prio(&self, year: i32, id: &ItemId, prio: Option<u8>) -> Self {
        self.update(year, id, |goal| goal.prio = normalize_prio(prio))
    }

    pub fn cycle_prio(&self, year: i32, id: &ItemId) -> Self {
        self.update(year, id, |goal| goal.prio = cycle_priority(goal.prio))
    }

    pub fn remove(&self, year: i32, id: &ItemId) -> Self {
        let mut next = self.clone();
        if let Some(goals) = next.years.get_mut(&year) {
            goals.retain(|goal| &goal.id != id);
        }
        next
    }

    fn update(&self, year: i32, id: &ItemId, f: impl FnOnce(&mut GoalItem)) -> Self {
        let mut next = self.clone();
        if let Some(goal) = next
            .years
            .get_mut(&year)
            .and_then(|goals| goals.iter_mut().find(|goal| &goal.id == id))
        {
            f(goal);
        }
        next
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvoidList {
    items: Vec<AvoidItem>,
}

impl AvoidList {
    pub fn items(&self) -> &[AvoidItem] {
        &self.items
    }

    pub fn sorted(&self) -> Vec<AvoidItem> {
        sort_by_priority(&self.items)
    }

    pub fn add(&self, title: &str, prio: Option<u8>) -> Self {
        let title = title.trim();
        if title.is_empty() {
            return self.clone();
        }
        let mut next = self.clone();
        next.items.push(AvoidItem {
            id: ItemId::generate(),
            title: title.to_string(),
            prio: normalize_prio(prio),
        });
        next
    }

    pub fn set_prio(&self, id: &ItemId, prio: Option<u8>) -> Self {
        self.update(id, |item| item.prio = normalize_prio(prio))
    }

    pub fn cycle_prio(&self, id: &ItemId) -> Self {
        self.update(id, |item| item.prio = cycle_priority(item.prio))
    }

    pub fn remove(&self, id: &ItemId) -> Self {
        let mut next = self.clone();
        next.items.retain(|item| &item.id != id);
        next
    }

    fn update(&self, id: &ItemId, f: impl FnOnce(&mut AvoidItem)) -> Self {
        let mut next = self.clone();
        if let Some(item) = next.items.iter_mut().find(|item| &item.id == id) {
            f(item);
        }
        next
    }
}

/// Message board posts, newest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    posts: Vec<BoardPost>,
}

impl Board {
    pub fn posts(&self) -> &[BoardPost] {
        &self.posts
    }

    /// Publish a post at the top of the board. Title and content are required;
    /// a blank author falls back to `default_author`.
    pub fn post(
        &self,
        title: &str,
        content: &str,
        author: &str,
        default_author: &str,
        now: NaiveDateTime,
    ) -> Self {
        let (title, content) = (title.trim(), content.trim());
        if title.is_empty() || content.is_empty() {
            return self.clone();
        }
        let author = match author.trim() {
            "" => default_author.to_string(),
            a => a.to_string(),
        };
        let mut next = self.clone();
        next.posts.insert(
            0,
            BoardPost {
                id: ItemId::generate(),
                title: title.to_string(),
                content: content.to_string(),
                author,
                timestamp: now.format("%Y-%m-%d %H:%M").to_string(),
            },
        );
        next
    }

    /// Delete a post. Only allowed while the admin gate is unlocked.
    pub fn remove(&self, id: &ItemId, admin: &PinGate) -> Result<Self, GateError> {
        admin.ensure_unlocked()?;
        let mut next = self.clone();
        next.posts.retain(|post| &post.id != id);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_todo_mutations_return_new_snapshots() {
        let empty = TodoBook::default();
        let one = empty.add(day("2025-06-01"), "  water plants ", 5);
        assert!(empty.items_on(day("2025-06-01")).is_empty());

        let item = &one.items_on(day("2025-06-01"))[0];
        assert_eq!(item.text, "water plants");
        assert_eq!(item.stars, MAX_STARS);
        assert!(!item.done);

        let id = item.id.clone();
        let toggled = one.toggle(day("2025-06-01"), &id);
        assert!(toggled.items_on(day("2025-06-01"))[0].done);
        assert!(!one.items_on(day("2025-06-01"))[0].done);

        let starred = toggled.set_stars(day("2025-06-01"), &id, 1);
        assert_eq!(starred.items_on(day("2025-06-01"))[0].stars, 1);

        let removed = starred.remove(day("2025-06-01"), &id);
        assert!(removed.items_on(day("2025-06-01")).is_empty());
        // bucket remains as an empty list
        assert_eq!(serde_json::to_string(&removed).unwrap(), r#"{"2025-06-01":[]}"#);
    }

    #[test]
    fn test_blank_todo_is_ignored() {
        let book = TodoBook::default().add(day("2025-06-01"), "   ", 0);
        assert_eq!(book, TodoBook::default());
    }

    #[test]
    fn test_numeric_ids_and_loose_stars_are_accepted() {
        let json = r#"{"2025-06-01":[{"id":1717200000000,"text":"old","done":true,"stars":7},
                                     {"id":"abc","text":"new","stars":"x"}]}"#;
        let book: TodoBook = serde_json::from_str(json).unwrap();
        let items = book.items_on(day("2025-06-01"));
        assert_eq!(items[0].id.as_str(), "1717200000000");
        assert_eq!(items[0].stars, 3);
        assert_eq!(items[1].stars, 0);
        assert!(!items[1].done);
    }

    #[test]
    fn test_goals_sorted_by_priority() {
        let book = GoalBook::default()
            .add(2025, "run", Some(2))
            .add(2025, "read", None)
            .add(2025, "save", Some(1))
            .add(2025, "write", Some(9));
        let titles: Vec<_> = book.sorted(2025).into_iter().map(|g| g.title).collect();
        assert_eq!(titles, vec!["save", "run", "read", "write"]);
        assert!(book.goals_in(2026).is_empty());
    }

    #[test]
    fn test_goal_prio_cycle_and_toggle() {
        let book = GoalBook::default().add(2025, "run", None);
        let id = book.goals_in(2025)[0].id.clone();
        let book = book.cycle_prio(2025, &id).cycle_prio(2025, &id);
        assert_eq!(book.goals_in(2025)[0].prio, Some(2));
        let book = book.toggle(2025, &id);
        assert!(book.goals_in(2025)[0].done);
        let book = book.remove(2025, &id);
        assert!(book.goals_in(2025).is_empty());
    }

    #[test]
    fn test_avoid_list() {
        let list = AvoidList::default()
            .add("late snacks", None)
            .add("doomscrolling", Some(1));
        let titles: Vec<_> = list.sorted().into_iter().map(|i| i.title).collect();
        assert_eq!(titles, vec!["doomscrolling", "late snacks"]);
        let id = list.items()[0].id.clone();
        let list = list.set_prio(&id, Some(3)).remove(&list.items()[1].id);
        assert_eq!(list.items().len(), 1);
        assert_eq!(list.items()[0].prio, Some(3));
    }

    #[test]
    fn test_board_newest_first_and_default_author() {
        let board = Board::default()
            .post("first", "hello", "", "anonymous", noon())
            .post("second", "again", "kim", "anonymous", noon());
        assert_eq!(board.posts()[0].title, "second");
        assert_eq!(board.posts()[1].author, "anonymous");
        assert_eq!(board.posts()[1].timestamp, "2025-06-01 12:00");

        let unchanged = board.post("", "no title", "kim", "anonymous", noon());
        assert_eq!(unchanged.posts().len(), 2);
    }

    #[test]
    fn test_board_delete_requires_admin() {
        let board = Board::default().post("t", "c", "a", "anonymous", noon());
        let id = board.posts()[0].id.clone();

        let mut admin = PinGate::new("4321");
        assert_eq!(board.remove(&id, &admin), Err(GateError::Locked));
        admin.try_unlock("4321").unwrap();
        assert!(board.remove(&id, &admin).unwrap().posts().is_empty());
    }
}
