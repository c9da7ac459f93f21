// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A student-courses query served through a read-through cache, and an enroll command
//! that invalidates the student's entry after writing to the data store.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use readthru::{CacheTelemetry, Error, InMemoryBackend, KeyShape, ReadThroughCache, TtlPolicy};
use serde::{Deserialize, Serialize};

const STUDENT_COURSES: KeyShape = KeyShape::new('S', 'C');
const ENROLLMENT_TTL: TtlPolicy = TtlPolicy::sliding(Duration::from_secs(3600));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Course {
    id: u32,
    name: String,
}

/// Stands in for a database.
#[derive(Debug, Default)]
struct DataStore {
    queries: AtomicU32,
}

impl DataStore {
    async fn enrolled_courses(&self, student_id: u32) -> Option<Vec<Course>> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(100)).await;

        let courses: Vec<Course> = [Course {
            id: 1,
            name: "CS".to_owned(),
        }]
        .into_iter()
        .filter(|course| course.id == student_id)
        .collect();

        (!courses.is_empty()).then_some(courses)
    }

    async fn enroll(&self, _student_id: u32, _course_id: u32) -> Result<bool, std::io::Error> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(true)
    }
}

struct StudentCoursesQuery {
    cache: Arc<ReadThroughCache<InMemoryBackend>>,
    store: Arc<DataStore>,
}

impl StudentCoursesQuery {
    async fn enrolled_courses(&self, student_id: u32) -> Result<Vec<Course>, Error> {
        let store = Arc::clone(&self.store);
        let courses = self
            .cache
            .get(STUDENT_COURSES.key(student_id), ENROLLMENT_TTL, move || async move {
                store.enrolled_courses(student_id).await
            })
            .await?;

        Ok(courses.unwrap_or_default())
    }

    async fn enroll(&self, student_id: u32, course_id: u32) -> Result<bool, Error> {
        let store = Arc::clone(&self.store);
        self.cache
            .update_then_invalidate(STUDENT_COURSES.key(student_id), async move {
                store.enroll(student_id, course_id).await
            })
            .await
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let cache = ReadThroughCache::builder()
        .memory()
        .name("student-courses")
        .telemetry(CacheTelemetry::new(true))
        .build();
    let query = Arc::new(StudentCoursesQuery {
        cache: Arc::new(cache),
        store: Arc::new(DataStore::default()),
    });

    // Ten concurrent requests for the same student share one data-store query.
    let handles: Vec<_> = (0..10)
        .map(|_| {
            let query = Arc::clone(&query);
            tokio::spawn(async move { query.enrolled_courses(1).await })
        })
        .collect();
    for handle in handles {
        let courses = handle.await.expect("task panicked")?;
        assert_eq!(courses.len(), 1);
    }
    println!("data-store queries after 10 requests: {}", query.store.queries.load(Ordering::Relaxed));

    // Students without enrollments are not cached, each lookup asks the store again.
    assert!(query.enrolled_courses(7).await?.is_empty());
    assert!(query.enrolled_courses(7).await?.is_empty());

    // Enrolling drops the cached list; the next request reloads it.
    query.enroll(1, 2).await?;
    query.enrolled_courses(1).await?;
    println!("data-store queries in total: {}", query.store.queries.load(Ordering::Relaxed));

    Ok(())
}
