//! Seed catalog served until listings come from a real backend.

use chrono::{DateTime, Duration, Utc};

use crate::model::{parse_rate_value, ExperienceLevel, JobPosting, JobType, Urgency};

struct Seed {
    title: &'static str,
    category: &'static str,
    location: &'static str,
    rate: &'static str,
    description: &'static str,
    posted_by: &'static str,
    age: Duration,
    urgency: Urgency,
    job_type: JobType,
    experience_level: ExperienceLevel,
    distance_km: f64,
    rating: f32,
    reviews: u32,
}

fn seeds() -> Vec<Seed> {
    vec![
        Seed {
            title: "Plumbing Repair - Leaking Faucet",
            category: "Plumbing",
            location: "Gueliz, Marrakech",
            rate: "€40/hr",
            description: "The bathroom faucet has been dripping for a week and it is getting worse. Need someone who can bring replacement parts.",
            posted_by: "Sarah Johnson",
            age: Duration::hours(2),
            urgency: Urgency::Urgent,
            job_type: JobType::OneTime,
            experience_level: ExperienceLevel::Entry,
            distance_km: 3.5,
            rating: 4.8,
            reviews: 24,
        },
        Seed {
            title: "Electrical Wiring Installation",
            category: "Electrical",
            location: "Hivernage, Marrakech",
            rate: "€55/hr",
            description: "Rewire the kitchen and add four new outlets. The panel has spare capacity and the walls are open.",
            posted_by: "Michael Brown",
            age: Duration::hours(26),
            urgency: Urgency::High,
            job_type: JobType::OneTime,
            experience_level: ExperienceLevel::Expert,
            distance_km: 8.0,
            rating: 4.6,
            reviews: 18,
        },
        Seed {
            title: "Custom Bookshelf Carpentry",
            category: "Carpentry",
            location: "Medina, Marrakech",
            rate: "€45/hr",
            description: "Build a custom bookshelf for the living room, roughly 6ft tall by 4ft wide, with adjustable shelves.",
            posted_by: "Emily Davis",
            age: Duration::days(3),
            urgency: Urgency::Normal,
            job_type: JobType::OneTime,
            experience_level: ExperienceLevel::Intermediate,
            distance_km: 12.0,
            rating: 4.9,
            reviews: 31,
        },
        Seed {
            title: "Interior Painting - Living Room",
            category: "Painting",
            location: "Maarif, Casablanca",
            rate: "€30/hr",
            description: "Paint the walls of a 15x20 ft living room. Ceiling was recently done and the paint is already purchased.",
            posted_by: "David Wilson",
            age: Duration::days(5),
            urgency: Urgency::Normal,
            job_type: JobType::OneTime,
            experience_level: ExperienceLevel::Intermediate,
            distance_km: 15.0,
            rating: 4.5,
            reviews: 12,
        },
        Seed {
            title: "Weekly House Cleaning",
            category: "Cleaning",
            location: "Agdal, Rabat",
            rate: "€20/hr",
            description: "Looking for a weekly deep clean of a two-bedroom apartment including kitchen, bathrooms and floors.",
            posted_by: "Lisa Martinez",
            age: Duration::hours(10),
            urgency: Urgency::Normal,
            job_type: JobType::Recurring,
            experience_level: ExperienceLevel::Entry,
            distance_km: 5.0,
            rating: 4.7,
            reviews: 40,
        },
        Seed {
            title: "Bathroom Pipe Replacement",
            category: "Plumbing",
            location: "Ain Diab, Casablanca",
            rate: "€60/hr",
            description: "Old galvanized pipes under the bathroom need to be replaced with PEX. Water shutoff valves work.",
            posted_by: "Robert Taylor",
            age: Duration::days(10),
            urgency: Urgency::High,
            job_type: JobType::OneTime,
            experience_level: ExperienceLevel::Expert,
            distance_km: 20.0,
            rating: 4.4,
            reviews: 9,
        },
        Seed {
            title: "Garden Maintenance",
            category: "Gardening",
            location: "Palmeraie, Marrakech",
            rate: "€25/hr",
            description: "Monthly lawn mowing, hedge trimming and watering system checks for a villa garden.",
            posted_by: "Karim Benali",
            age: Duration::days(14),
            urgency: Urgency::Normal,
            job_type: JobType::Recurring,
            experience_level: ExperienceLevel::Entry,
            distance_km: 25.0,
            rating: 4.2,
            reviews: 7,
        },
        Seed {
            title: "Furniture Moving Help",
            category: "Moving",
            location: "Tangier",
            rate: "€35/hr",
            description: "Need two people to help load a moving truck this weekend. Third floor, elevator available.",
            posted_by: "Nadia El Amrani",
            age: Duration::days(40),
            urgency: Urgency::Urgent,
            job_type: JobType::OneTime,
            experience_level: ExperienceLevel::Entry,
            distance_km: 45.0,
            rating: 4.0,
            reviews: 3,
        },
    ]
}

/// The eight seed postings, dated relative to `now`.
pub fn sample_jobs(now: DateTime<Utc>) -> Vec<JobPosting> {
    seeds()
        .into_iter()
        .zip(1..)
        .map(|(seed, id)| JobPosting {
            id,
            title: seed.title.to_string(),
            category: seed.category.to_string(),
            location: seed.location.to_string(),
            rate: seed.rate.to_string(),
            rate_value: parse_rate_value(seed.rate),
            description: seed.description.to_string(),
            posted_by: seed.posted_by.to_string(),
            posted_at: now - seed.age,
            urgency: seed.urgency,
            job_type: seed.job_type,
            experience_level: seed.experience_level,
            distance_km: seed.distance_km,
            rating: seed.rating,
            reviews: seed.reviews,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{DEFAULT_MAX_DISTANCE_KM, DEFAULT_PRICE_RANGE};
    use std::collections::HashSet;

    #[test]
    fn test_sample_has_eight_jobs_with_unique_ids() {
        let jobs = sample_jobs(Utc::now());
        assert_eq!(jobs.len(), 8);
        let ids: HashSet<_> = jobs.iter().map(|j| j.id).collect();
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn test_sample_fits_default_slider_bounds() {
        for job in sample_jobs(Utc::now()) {
            let rate = job.rate_value.expect("sample rates parse");
            assert!(DEFAULT_PRICE_RANGE.contains(rate), "{}", job.title);
            assert!(job.distance_km <= DEFAULT_MAX_DISTANCE_KM, "{}", job.title);
        }
    }

    #[test]
    fn test_only_one_job_costs_forty() {
        let jobs = sample_jobs(Utc::now());
        let forty: Vec<_> = jobs.iter().filter(|j| j.rate_value == Some(40.0)).collect();
        assert_eq!(forty.len(), 1);
        assert_eq!(forty[0].title, "Plumbing Repair - Leaking Faucet");
    }
}
