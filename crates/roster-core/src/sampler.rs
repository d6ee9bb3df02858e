use rand::Rng;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

/// Number of past selections the sampler remembers.
pub const HISTORY_DEPTH: usize = 6;

// --- History window ---

/// Rolling window of past selections, most recent first.
///
/// Invariants: at most [`HISTORY_DEPTH`] selections; insertion is always
/// at the front; the oldest selection is dropped once the window is full.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryWindow {
    selections: Vec<Vec<String>>,
}

impl HistoryWindow {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_selections(mut selections: Vec<Vec<String>>) -> Self {
        selections.truncate(HISTORY_DEPTH);
        Self { selections }
    }

    /// Push a selection onto the front, dropping the oldest past the depth.
    pub fn record(&mut self, selection: Vec<String>) {
        self.selections.insert(0, selection);
        self.selections.truncate(HISTORY_DEPTH);
    }

    /// Union of all names in the window.
    pub fn excluded(&self) -> HashSet<&str> {
        self.selections
            .iter()
            .flatten()
            .map(|name| name.as_str())
            .collect()
    }

    /// Selections, most recent first.
    pub fn selections(&self) -> &[Vec<String>] {
        &self.selections
    }

    pub fn newest(&self) -> Option<&[String]> {
        self.selections.first().map(|s| s.as_slice())
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

// --- Sampler ---

/// Draws random subsets of the roster, biased away from names selected in
/// the last [`HISTORY_DEPTH`] generations. The window is persisted to a
/// flat JSON file (an array of string arrays, most recent first) which is
/// rewritten in full after every sampling draw.
#[derive(Debug)]
pub struct Sampler {
    window: HistoryWindow,
    path: PathBuf,
}

impl Sampler {
    /// Load the history window from `path`. A missing file yields an empty
    /// window; a malformed file is an error with no recovery path.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, String> {
        let path = path.into();
        let window = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|e| e.to_string())?;
            let selections: Vec<Vec<String>> =
                serde_json::from_str(&raw).map_err(|e| e.to_string())?;
            HistoryWindow::from_selections(selections)
        } else {
            HistoryWindow::new()
        };
        Ok(Self { window, path })
    }

    pub fn window(&self) -> &HistoryWindow {
        &self.window
    }

    /// Draw `count` names from `all` (the roster in store order), preferring
    /// names outside the recent window. Rules, in order:
    ///
    /// 1. If the pool is not larger than the request, return it unchanged:
    ///    no sampling, no history update, no file write.
    /// 2. Drop names selected in any of the windowed generations.
    /// 3. If that leaves fewer than `count`, abandon the exclusion entirely
    ///    for this call and draw from the full pool.
    /// 4. Draw without replacement, uniformly, from a shrinking candidate
    ///    list; returned order is draw order.
    /// 5. Record the draw at the front of the window and persist it before
    ///    returning. The write is attempted once; its failure is the only
    ///    error this function produces.
    ///
    /// `count` must be at least 1; callers validate ranges before this point.
    pub fn generate<R: Rng>(
        &mut self,
        rng: &mut R,
        all: &[String],
        count: usize,
    ) -> Result<Vec<String>, String> {
        if all.len() <= count {
            return Ok(all.to_vec());
        }

        let excluded = self.window.excluded();
        let mut eligible: Vec<&String> = all
            .iter()
            .filter(|name| !excluded.contains(name.as_str()))
            .collect();
        if eligible.len() < count {
            eligible = all.iter().collect();
        }

        let mut drawn = Vec::with_capacity(count);
        while drawn.len() < count && !eligible.is_empty() {
            let idx = rng.random_range(0..eligible.len());
            drawn.push(eligible.swap_remove(idx).clone());
        }

        self.window.record(drawn.clone());
        self.save()?;
        Ok(drawn)
    }

    /// Rewrite the whole window to disk via a temp file + rename, so a
    /// crash mid-write cannot leave a torn file.
    fn save(&self) -> Result<(), String> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| e.to_string())?;
        }
        let json =
            serde_json::to_string_pretty(&self.window.selections).map_err(|e| e.to_string())?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| e.to_string())?;
        fs::rename(&tmp, &self.path).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::path::Path;

    fn pool(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Name {}", i)).collect()
    }

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("roster-sampler-{}-{}", std::process::id(), name));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn sampler(dir: &Path) -> Sampler {
        Sampler::load(dir.join("history.json")).expect("load failed")
    }

    fn as_set(names: &[String]) -> HashSet<&str> {
        names.iter().map(|n| n.as_str()).collect()
    }

    #[test]
    fn passthrough_returns_pool_in_store_order() {
        let dir = test_dir("passthrough");
        let mut sampler = sampler(&dir);
        let mut rng = StdRng::seed_from_u64(1);
        let all = pool(3);

        let exact = sampler.generate(&mut rng, &all, 3).unwrap();
        assert_eq!(exact, all);
        let over = sampler.generate(&mut rng, &all, 5).unwrap();
        assert_eq!(over, all);

        // No sampling happened, so neither the window nor the file moved.
        assert!(sampler.window().is_empty());
        assert!(!dir.join("history.json").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn sampling_returns_count_distinct_pool_members() {
        let dir = test_dir("distinct");
        let mut sampler = sampler(&dir);
        let mut rng = StdRng::seed_from_u64(2);
        let all = pool(10);

        let drawn = sampler.generate(&mut rng, &all, 3).unwrap();
        assert_eq!(drawn.len(), 3);
        let distinct = as_set(&drawn);
        assert_eq!(distinct.len(), 3);
        assert!(distinct.is_subset(&as_set(&all)));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn newest_window_entry_matches_returned_names() {
        let dir = test_dir("newest");
        let mut sampler = sampler(&dir);
        let mut rng = StdRng::seed_from_u64(3);
        let all = pool(10);

        let drawn = sampler.generate(&mut rng, &all, 4).unwrap();
        assert_eq!(sampler.window().newest(), Some(drawn.as_slice()));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn window_never_exceeds_depth() {
        let mut window = HistoryWindow::new();
        for i in 0..10 {
            window.record(vec![format!("Name {}", i)]);
        }
        assert_eq!(window.len(), HISTORY_DEPTH);
        // Most recent first: the four oldest recordings were dropped.
        assert_eq!(window.newest(), Some(&["Name 9".to_string()][..]));
    }

    #[test]
    fn window_caps_across_many_generations() {
        let dir = test_dir("cap");
        let mut sampler = sampler(&dir);
        let mut rng = StdRng::seed_from_u64(4);
        let all = pool(30);

        for _ in 0..10 {
            sampler.generate(&mut rng, &all, 2).unwrap();
        }
        assert_eq!(sampler.window().len(), HISTORY_DEPTH);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn fallback_abandons_exclusions_entirely() {
        let dir = test_dir("fallback");
        let mut sampler = sampler(&dir);
        let mut rng = StdRng::seed_from_u64(5);
        let all = pool(4);

        let first = sampler.generate(&mut rng, &all, 3).unwrap();
        assert_eq!(as_set(&first).len(), 3);

        // Only one name is eligible now, so the exclusion is dropped and the
        // draw runs over the full pool again.
        let second = sampler.generate(&mut rng, &all, 3).unwrap();
        assert_eq!(second.len(), 3);
        assert_eq!(as_set(&second).len(), 3);
        assert!(as_set(&second).is_subset(&as_set(&all)));
        assert_eq!(sampler.window().len(), 2);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn recent_window_is_avoided_while_exclusions_hold() {
        // A pool of 21 keeps exclusions live across a full window: six draws
        // of three cover 18 names, leaving exactly three for the seventh.
        let dir = test_dir("recency");
        let mut sampler = sampler(&dir);
        let mut rng = StdRng::seed_from_u64(6);
        let all = pool(21);

        let draws: Vec<Vec<String>> = (0..7)
            .map(|_| sampler.generate(&mut rng, &all, 3).unwrap())
            .collect();

        let seventh = as_set(&draws[6]);
        let recent: HashSet<&str> = draws[1..6].iter().flatten().map(|n| n.as_str()).collect();
        assert!(seventh.is_disjoint(&recent));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn small_pool_survives_repeated_generations() {
        // Pool of 10 with draws of 3: six windowed selections exhaust the
        // pool, so the fallback engages and every call still succeeds.
        let dir = test_dir("small-pool");
        let mut sampler = sampler(&dir);
        let mut rng = StdRng::seed_from_u64(7);
        let all = pool(10);

        for _ in 0..7 {
            let drawn = sampler.generate(&mut rng, &all, 3).unwrap();
            assert_eq!(drawn.len(), 3);
            assert_eq!(as_set(&drawn).len(), 3);
            assert!(as_set(&drawn).is_subset(&as_set(&all)));
        }
        assert_eq!(sampler.window().len(), HISTORY_DEPTH);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn window_round_trips_through_the_file() {
        let dir = test_dir("roundtrip");
        let mut sampler = sampler(&dir);
        let mut rng = StdRng::seed_from_u64(8);
        let all = pool(10);

        sampler.generate(&mut rng, &all, 3).unwrap();
        sampler.generate(&mut rng, &all, 3).unwrap();

        let reloaded = Sampler::load(dir.join("history.json")).unwrap();
        assert_eq!(reloaded.window(), sampler.window());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn persisted_file_is_an_array_of_string_arrays() {
        let dir = test_dir("format");
        let mut sampler = sampler(&dir);
        let mut rng = StdRng::seed_from_u64(9);
        let all = pool(10);

        let drawn = sampler.generate(&mut rng, &all, 3).unwrap();
        let raw = fs::read_to_string(dir.join("history.json")).unwrap();
        let parsed: Vec<Vec<String>> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, vec![drawn]);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_loads_as_empty_window() {
        let dir = test_dir("missing");
        let sampler = Sampler::load(dir.join("history.json")).unwrap();
        assert!(sampler.window().is_empty());
    }

    #[test]
    fn malformed_file_is_a_load_error() {
        let dir = test_dir("malformed");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("history.json");
        fs::write(&path, "not json").unwrap();
        assert!(Sampler::load(&path).is_err());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn oversized_file_is_truncated_on_load() {
        let dir = test_dir("oversized");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("history.json");
        let selections: Vec<Vec<String>> = (0..9).map(|i| vec![format!("Name {}", i)]).collect();
        fs::write(&path, serde_json::to_string(&selections).unwrap()).unwrap();

        let sampler = Sampler::load(&path).unwrap();
        assert_eq!(sampler.window().len(), HISTORY_DEPTH);
        assert_eq!(sampler.window().newest(), Some(&["Name 0".to_string()][..]));
        let _ = fs::remove_dir_all(&dir);
    }
}
