use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};

use super::{contains, InMemoryStorage, StoredSexLog};
use crate::models::daily::{DailyItem, DailyItemType, DailyLog, DailyLogInput, NewDailyItem, ITEM_COMPLETED};
use crate::models::exercise::{ExerciseLog, ExerciseSearch, NewExerciseLog};
use crate::models::memo::{Memo, MemoPriority, NewMemo};
use crate::models::period::{MenstrualRecord, MenstrualRecordPatch, NewMenstrualRecord};
use crate::models::sex::{SexLog, SexLogInput, SexLogSaved};
use crate::models::stool::{DailyCount, StoolLog, StoolLogInput};
use crate::models::weight::{NewWeightLog, WeightLog};
use crate::repository::daily::{DailyRepository, HISTORY_SEARCH_LIMIT};
use crate::repository::errors::RepositoryError;
use crate::repository::exercise::ExerciseRepository;
use crate::repository::memo::MemoRepository;
use crate::repository::period::PeriodRepository;
use crate::repository::sex::SexRepository;
use crate::repository::stool::StoolRepository;
use crate::repository::weight::WeightRepository;

#[async_trait]
impl DailyRepository for InMemoryStorage {
    async fn list_items(&self, user_id: i64) -> Result<Vec<DailyItem>, RepositoryError> {
        let tables = self.lock()?;
        let mut items: Vec<DailyItem> = tables.daily_items.iter().filter(|i| i.user_id == user_id).cloned().collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn create_item(&self, user_id: i64, item: NewDailyItem) -> Result<DailyItem, RepositoryError> {
        let mut tables = self.lock()?;
        let item = DailyItem {
            id: tables.next_id(),
            user_id,
            item_name: item.item_name,
            item_type: item.item_type.as_str().to_string(),
            status: None,
            created_at: Utc::now(),
        };
        tables.daily_items.push(item.clone());
        Ok(item)
    }

    async fn delete_item(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        let Some(position) = tables.daily_items.iter().position(|i| i.id == id && i.user_id == user_id) else {
            return Ok(false);
        };
        let item = tables.daily_items.remove(position);
        tables
            .daily_logs
            .retain(|l| !(l.user_id == user_id && l.item_name == item.item_name));
        Ok(true)
    }

    async fn complete_item(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        match tables.daily_items.iter_mut().find(|i| {
            i.id == id && i.user_id == user_id && i.item_type == DailyItemType::OneTime.as_str()
        }) {
            Some(item) => {
                item.status = Some(ITEM_COMPLETED.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn logs_for_date(&self, user_id: i64, date: NaiveDate) -> Result<Vec<DailyLog>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .daily_logs
            .iter()
            .filter(|l| l.user_id == user_id && l.log_date == date)
            .cloned()
            .collect())
    }

    async fn upsert_log(&self, user_id: i64, log: DailyLogInput) -> Result<DailyLog, RepositoryError> {
        let mut tables = self.lock()?;
        if let Some(existing) = tables
            .daily_logs
            .iter_mut()
            .find(|l| l.user_id == user_id && l.log_date == log.log_date && l.item_name == log.item_name)
        {
            existing.status = log.status;
            existing.notes = log.notes;
            return Ok(existing.clone());
        }

        let saved = DailyLog {
            id: tables.next_id(),
            user_id,
            log_date: log.log_date,
            item_name: log.item_name,
            status: log.status,
            notes: log.notes,
        };
        tables.daily_logs.push(saved.clone());
        Ok(saved)
    }

    async fn search_logs(&self, user_id: i64, term: &str) -> Result<Vec<DailyLog>, RepositoryError> {
        let tables = self.lock()?;
        let mut logs: Vec<DailyLog> = tables
            .daily_logs
            .iter()
            .filter(|l| l.user_id == user_id && (contains(Some(&l.item_name), term) || contains(l.notes.as_deref(), term)))
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.log_date.cmp(&a.log_date).then(b.id.cmp(&a.id)));
        logs.truncate(HISTORY_SEARCH_LIMIT as usize);
        Ok(logs)
    }
}

#[async_trait]
impl ExerciseRepository for InMemoryStorage {
    async fn create(&self, user_id: i64, log: NewExerciseLog) -> Result<ExerciseLog, RepositoryError> {
        let mut tables = self.lock()?;
        let saved = ExerciseLog {
            id: tables.next_id(),
            user_id,
            log_date: log.log_date,
            exercise_name: log.exercise_name,
            duration_minutes: log.duration_minutes,
            sets: log.sets,
            reps: log.reps,
            notes: log.notes,
            created_at: Utc::now(),
        };
        tables.exercise_logs.push(saved.clone());
        Ok(saved)
    }

    async fn search(&self, user_id: i64, search: ExerciseSearch) -> Result<Vec<ExerciseLog>, RepositoryError> {
        let tables = self.lock()?;
        let name = search.exercise_name.as_deref().map(str::trim).filter(|n| !n.is_empty());
        let mut logs: Vec<ExerciseLog> = tables
            .exercise_logs
            .iter()
            .filter(|l| l.user_id == user_id && l.log_date >= search.start_date && l.log_date <= search.end_date)
            .filter(|l| name.map_or(true, |n| contains(Some(&l.exercise_name), n)))
            .cloned()
            .collect();
        logs.sort_by(|a, b| a.log_date.cmp(&b.log_date).then(a.id.cmp(&b.id)));
        Ok(logs)
    }

    async fn for_date(&self, user_id: i64, date: NaiveDate) -> Result<Vec<ExerciseLog>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .exercise_logs
            .iter()
            .filter(|l| l.user_id == user_id && l.log_date == date)
            .cloned()
            .collect())
    }

    async fn active_dates(
        &self,
        user_id: i64,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<Vec<NaiveDate>, RepositoryError> {
        let tables = self.lock()?;
        let mut dates: Vec<NaiveDate> = tables
            .exercise_logs
            .iter()
            .filter(|l| l.user_id == user_id && l.log_date >= first && l.log_date <= last)
            .map(|l| l.log_date)
            .collect();
        dates.sort();
        dates.dedup();
        Ok(dates)
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        let before = tables.exercise_logs.len();
        tables.exercise_logs.retain(|l| !(l.id == id && l.user_id == user_id));
        Ok(tables.exercise_logs.len() < before)
    }
}

#[async_trait]
impl MemoRepository for InMemoryStorage {
    async fn list(&self, user_id: i64) -> Result<Vec<Memo>, RepositoryError> {
        let tables = self.lock()?;
        let mut memos: Vec<Memo> = tables.memos.iter().filter(|m| m.user_id == user_id).cloned().collect();
        memos.sort_by(|a, b| {
            a.is_completed
                .cmp(&b.is_completed)
                .then(MemoPriority::rank(&a.priority).cmp(&MemoPriority::rank(&b.priority)))
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });
        Ok(memos)
    }

    async fn create(&self, user_id: i64, memo: NewMemo) -> Result<Memo, RepositoryError> {
        let mut tables = self.lock()?;
        let saved = Memo {
            id: tables.next_id(),
            user_id,
            task_name: memo.task_name,
            priority: memo.priority.as_str().to_string(),
            is_completed: false,
            created_at: Utc::now(),
            completed_at: None,
        };
        tables.memos.push(saved.clone());
        Ok(saved)
    }

    async fn set_completed(&self, user_id: i64, id: i64, completed: bool) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        match tables.memos.iter_mut().find(|m| m.id == id && m.user_id == user_id) {
            Some(memo) => {
                memo.is_completed = completed;
                memo.completed_at = completed.then(Utc::now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        let before = tables.memos.len();
        tables.memos.retain(|m| !(m.id == id && m.user_id == user_id));
        Ok(tables.memos.len() < before)
    }

    async fn search_completed(&self, user_id: i64, term: &str) -> Result<Vec<Memo>, RepositoryError> {
        let tables = self.lock()?;
        let mut memos: Vec<Memo> = tables
            .memos
            .iter()
            .filter(|m| m.user_id == user_id && m.is_completed && contains(Some(&m.task_name), term))
            .cloned()
            .collect();
        memos.sort_by(|a, b| b.completed_at.cmp(&a.completed_at).then(b.id.cmp(&a.id)));
        Ok(memos)
    }
}

#[async_trait]
impl PeriodRepository for InMemoryStorage {
    async fn list(&self, user_id: i64) -> Result<Vec<MenstrualRecord>, RepositoryError> {
        let tables = self.lock()?;
        let mut records: Vec<MenstrualRecord> = tables
            .menstrual_records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    async fn create(&self, user_id: i64, record: NewMenstrualRecord) -> Result<MenstrualRecord, RepositoryError> {
        let mut tables = self.lock()?;
        let saved = MenstrualRecord {
            id: tables.next_id(),
            user_id,
            start_date: record.start_date,
            end_date: None,
            pain_level: Some(record.pain_level),
            flow_volume: Some(record.flow_volume),
            notes: record.notes,
            color: record.color,
            state: record.state,
        };
        tables.menstrual_records.push(saved.clone());
        Ok(saved)
    }

    async fn update(&self, user_id: i64, id: i64, patch: MenstrualRecordPatch) -> Result<bool, RepositoryError> {
        if patch.is_empty() {
            return Ok(false);
        }
        let mut tables = self.lock()?;
        match tables
            .menstrual_records
            .iter_mut()
            .find(|r| r.id == id && r.user_id == user_id)
        {
            Some(record) => {
                patch.apply(record);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        let before = tables.menstrual_records.len();
        tables.menstrual_records.retain(|r| !(r.id == id && r.user_id == user_id));
        Ok(tables.menstrual_records.len() < before)
    }
}

#[async_trait]
impl SexRepository for InMemoryStorage {
    async fn list(&self, user_id: i64) -> Result<Vec<SexLog>, RepositoryError> {
        let tables = self.lock()?;
        let mut logs: Vec<SexLog> = tables
            .sex_logs
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.log.clone())
            .collect();
        logs.sort_by(|a, b| b.log_date.cmp(&a.log_date));
        Ok(logs)
    }

    async fn save(&self, user_id: i64, log: SexLogInput) -> Result<SexLogSaved, RepositoryError> {
        let mut tables = self.lock()?;
        if let Some(existing) = tables
            .sex_logs
            .iter_mut()
            .find(|s| s.user_id == user_id && s.log.log_date == log.log_date)
        {
            existing.log.protection_method = log.protection_method;
            return Ok(SexLogSaved::Updated(existing.log.id));
        }

        let id = tables.next_id();
        tables.sex_logs.push(StoredSexLog {
            user_id,
            log: SexLog {
                id,
                log_date: log.log_date,
                protection_method: log.protection_method,
            },
        });
        Ok(SexLogSaved::Inserted(id))
    }

    async fn delete_by_date(&self, user_id: i64, date: NaiveDate) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        let before = tables.sex_logs.len();
        tables
            .sex_logs
            .retain(|s| !(s.user_id == user_id && s.log.log_date == date));
        Ok(tables.sex_logs.len() < before)
    }
}

#[async_trait]
impl StoolRepository for InMemoryStorage {
    async fn list(&self, user_id: i64, range: Option<(NaiveDate, NaiveDate)>) -> Result<Vec<StoolLog>, RepositoryError> {
        let tables = self.lock()?;
        let mut logs: Vec<StoolLog> = tables
            .stool_logs
            .iter()
            .filter(|l| l.user_id == user_id)
            .filter(|l| range.map_or(true, |(start, end)| l.log_date >= start && l.log_date <= end))
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.log_date.cmp(&a.log_date).then(b.id.cmp(&a.id)));
        Ok(logs)
    }

    async fn dates(&self, user_id: i64) -> Result<Vec<NaiveDate>, RepositoryError> {
        let tables = self.lock()?;
        let mut dates: Vec<NaiveDate> = tables
            .stool_logs
            .iter()
            .filter(|l| l.user_id == user_id)
            .map(|l| l.log_date)
            .collect();
        dates.sort_by(|a, b| b.cmp(a));
        dates.dedup();
        Ok(dates)
    }

    async fn daily_counts(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyCount>, RepositoryError> {
        let tables = self.lock()?;
        let mut counts: Vec<DailyCount> = Vec::new();
        let mut dates: Vec<NaiveDate> = tables
            .stool_logs
            .iter()
            .filter(|l| l.user_id == user_id && l.log_date >= start && l.log_date <= end)
            .map(|l| l.log_date)
            .collect();
        dates.sort();
        for date in dates {
            match counts.last_mut() {
                Some(last) if last.log_date == date => last.count += 1,
                _ => counts.push(DailyCount { log_date: date, count: 1 }),
            }
        }
        Ok(counts)
    }

    async fn create(&self, user_id: i64, log: StoolLogInput) -> Result<StoolLog, RepositoryError> {
        let mut tables = self.lock()?;
        let saved = StoolLog {
            id: tables.next_id(),
            user_id,
            log_date: log.log_date,
            stool_type: log.stool_type,
            notes: log.notes,
            created_at: Utc::now(),
        };
        tables.stool_logs.push(saved.clone());
        Ok(saved)
    }

    async fn update(&self, user_id: i64, id: i64, log: StoolLogInput) -> Result<Option<StoolLog>, RepositoryError> {
        let mut tables = self.lock()?;
        Ok(tables
            .stool_logs
            .iter_mut()
            .find(|l| l.id == id && l.user_id == user_id)
            .map(|existing| {
                existing.log_date = log.log_date;
                existing.stool_type = log.stool_type;
                existing.notes = log.notes;
                existing.clone()
            }))
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        let before = tables.stool_logs.len();
        tables.stool_logs.retain(|l| !(l.id == id && l.user_id == user_id));
        Ok(tables.stool_logs.len() < before)
    }
}

#[async_trait]
impl WeightRepository for InMemoryStorage {
    async fn recent(&self, user_id: i64, count: i64) -> Result<Vec<WeightLog>, RepositoryError> {
        let tables = self.lock()?;
        let mut logs: Vec<WeightLog> = tables.weight_logs.iter().filter(|l| l.user_id == user_id).cloned().collect();
        logs.sort_by(|a, b| a.log_datetime.cmp(&b.log_datetime).then(a.id.cmp(&b.id)));
        let skip = logs.len().saturating_sub(count.max(0) as usize);
        Ok(logs.split_off(skip))
    }

    async fn between(
        &self,
        user_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<WeightLog>, RepositoryError> {
        let tables = self.lock()?;
        let mut logs: Vec<WeightLog> = tables
            .weight_logs
            .iter()
            .filter(|l| l.user_id == user_id && l.log_datetime >= start && l.log_datetime <= end)
            .cloned()
            .collect();
        logs.sort_by(|a, b| a.log_datetime.cmp(&b.log_datetime).then(a.id.cmp(&b.id)));
        Ok(logs)
    }

    async fn create(&self, user_id: i64, log: NewWeightLog) -> Result<WeightLog, RepositoryError> {
        let mut tables = self.lock()?;
        let saved = WeightLog {
            id: tables.next_id(),
            user_id,
            log_datetime: log.log_datetime,
            weight: log.weight,
        };
        tables.weight_logs.push(saved.clone());
        Ok(saved)
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        let before = tables.weight_logs.len();
        tables.weight_logs.retain(|l| !(l.id == id && l.user_id == user_id));
        Ok(tables.weight_logs.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_deleting_item_removes_its_logs() {
        let storage = InMemoryStorage::new();
        let item = storage
            .create_item(
                1,
                NewDailyItem {
                    item_name: "Vitamins".to_string(),
                    item_type: DailyItemType::Daily,
                },
            )
            .await
            .unwrap();
        for day in ["2024-03-01", "2024-03-02"] {
            storage
                .upsert_log(
                    1,
                    DailyLogInput {
                        log_date: date(day),
                        item_name: "Vitamins".to_string(),
                        status: Some("done".to_string()),
                        notes: None,
                    },
                )
                .await
                .unwrap();
        }

        assert!(storage.delete_item(1, item.id).await.unwrap());
        assert!(storage.search_logs(1, "Vitamins").await.unwrap().is_empty());
        assert!(!storage.delete_item(1, item.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_row_per_day_and_item() {
        let storage = InMemoryStorage::new();
        let input = |status: &str| DailyLogInput {
            log_date: date("2024-03-01"),
            item_name: "Stretch".to_string(),
            status: Some(status.to_string()),
            notes: None,
        };
        let first = storage.upsert_log(1, input("pending")).await.unwrap();
        let second = storage.upsert_log(1, input("done")).await.unwrap();
        assert_eq!(first.id, second.id);
        let logs = storage.logs_for_date(1, date("2024-03-01")).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status.as_deref(), Some("done"));
    }

    #[tokio::test]
    async fn test_only_one_time_items_complete() {
        let storage = InMemoryStorage::new();
        let daily = storage
            .create_item(1, NewDailyItem { item_name: "Walk".to_string(), item_type: DailyItemType::Daily })
            .await
            .unwrap();
        let once = storage
            .create_item(1, NewDailyItem { item_name: "Dentist".to_string(), item_type: DailyItemType::OneTime })
            .await
            .unwrap();
        assert!(!storage.complete_item(1, daily.id).await.unwrap());
        assert!(storage.complete_item(1, once.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_memo_ordering() {
        let storage = InMemoryStorage::new();
        let low = MemoRepository::create(&storage, 1, NewMemo { task_name: "low".into(), priority: MemoPriority::Low })
            .await
            .unwrap();
        MemoRepository::create(&storage, 1, NewMemo { task_name: "high".into(), priority: MemoPriority::High })
            .await
            .unwrap();
        let done = MemoRepository::create(&storage, 1, NewMemo { task_name: "done".into(), priority: MemoPriority::High })
            .await
            .unwrap();
        storage.set_completed(1, done.id, true).await.unwrap();

        let names: Vec<String> = MemoRepository::list(&storage, 1)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.task_name)
            .collect();
        assert_eq!(names, vec!["high", "low", "done"]);
        assert_eq!(storage.search_completed(1, "do").await.unwrap().len(), 1);
        assert!(storage.search_completed(1, &low.task_name).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sex_log_upserts_by_date() {
        let storage = InMemoryStorage::new();
        let input = |method: &str| SexLogInput {
            log_date: date("2024-05-01"),
            protection_method: Some(method.to_string()),
        };
        let SexLogSaved::Inserted(id) = storage.save(1, input("condom")).await.unwrap() else {
            panic!("expected insert");
        };
        assert_eq!(storage.save(1, input("none")).await.unwrap(), SexLogSaved::Updated(id));
        assert_eq!(SexRepository::list(&storage, 1).await.unwrap().len(), 1);
        assert!(storage.delete_by_date(1, date("2024-05-01")).await.unwrap());
        assert!(!storage.delete_by_date(1, date("2024-05-01")).await.unwrap());
    }

    #[tokio::test]
    async fn test_stool_counts_group_by_day() {
        let storage = InMemoryStorage::new();
        for day in ["2024-01-01", "2024-01-01", "2024-01-03"] {
            StoolRepository::create(
                &storage,
                1,
                StoolLogInput { log_date: date(day), stool_type: None, notes: None },
            )
            .await
            .unwrap();
        }
        let counts = storage.daily_counts(1, date("2024-01-01"), date("2024-01-31")).await.unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].count, 2);
        assert_eq!(storage.dates(1).await.unwrap(), vec![date("2024-01-03"), date("2024-01-01")]);
    }

    #[tokio::test]
    async fn test_recent_weights_are_latest_in_ascending_order() {
        let storage = InMemoryStorage::new();
        for day in 1..=20 {
            let at = date(&format!("2024-02-{:02}", day)).and_hms_opt(8, 0, 0).unwrap();
            WeightRepository::create(&storage, 1, NewWeightLog { log_datetime: at, weight: 60.0 + day as f64 })
                .await
                .unwrap();
        }
        let recent = storage.recent(1, 15).await.unwrap();
        assert_eq!(recent.len(), 15);
        assert_eq!(recent.first().map(|l| l.weight), Some(66.0));
        assert_eq!(recent.last().map(|l| l.weight), Some(80.0));
    }
}
