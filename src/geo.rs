// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Static country and city lookup used by the profile form.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Maximum number of cities returned by an unscoped search
pub const MAX_UNSCOPED_RESULTS: usize = 10;

/// Countries and their cities, in lookup order
static CITIES_BY_COUNTRY: &[(&str, &[&str])] = &[
    (
        "السعودية",
        &[
            "الرياض", "جدة", "مكة المكرمة", "المدينة المنورة", "الدمام", "الخبر", "الظهران",
            "تبوك", "بريدة", "خميس مشيط", "الهفوف", "حفر الباطن", "الطائف", "نجران",
            "جازان", "ينبع", "القطيف", "عرعر", "سكاكا", "أبها", "القصيم", "حائل",
            "الجبيل", "رابغ", "الباحة", "عنيزة", "الرس", "الزلفي", "وادي الدواسر",
            "الافلاج", "القريات", "طريف", "رفحاء", "الخرج", "المجمعة", "شقراء",
        ],
    ),
    (
        "مصر",
        &[
            "القاهرة", "الجيزة", "الإسكندرية", "بورسعيد", "السويس", "الإسماعيلية",
            "الأقصر", "أسوان", "أسيوط", "سوهاج", "قنا", "الفيوم", "بني سويف",
            "المنيا", "دمياط", "كفر الشيخ", "الغربية", "المنوفية", "القليوبية",
            "الشرقية", "الدقهلية", "البحيرة", "مطروح", "شمال سيناء", "جنوب سيناء",
            "الوادي الجديد", "البحر الأحمر", "طنطا", "المحلة الكبرى", "شبين الكوم",
            "بنها", "الزقازيق", "المنصورة", "دمنهور",
        ],
    ),
    (
        "الإمارات",
        &[
            "أبو ظبي", "دبي", "الشارقة", "عجمان", "أم القيوين", "رأس الخيمة", "الفجيرة",
            "العين", "الذيد", "خورفكان", "دبا الفجيرة", "كلباء", "مدينة زايد",
            "ليوا", "غياثي", "مزيرع", "دلما", "صير بني ياس", "جبل علي",
        ],
    ),
    (
        "قطر",
        &[
            "الدوحة", "الريان", "الوكرة", "أم صلال", "الخور", "الضعاين", "الشيحانية",
            "الغويرية", "الشمال", "مسيعيد", "دخان", "الكعبان", "الزبارة", "فويرط",
            "أبو ظلوف", "رأس لفان", "الرويس",
        ],
    ),
    (
        "الكويت",
        &[
            "مدينة الكويت", "الأحمدي", "حولي", "الفروانية", "الجهراء", "مبارك الكبير",
            "الفحيحيل", "الفنطاس", "أبو حليفة", "المهبولة", "صباح السالم", "بيان",
            "السالمية", "الجابرية", "الشعب", "الدعية", "الصليبيخات", "الرقة",
            "كيفان", "الشامية", "الصوابر", "أم الهيمان", "العدان", "المسيلة",
        ],
    ),
    (
        "البحرين",
        &[
            "المنامة", "المحرق", "الرفاع", "مدينة حمد", "مدينة عيسى", "سترة", "المالكية",
            "الحد", "البديع", "عالي", "سار", "توبلي", "جد حفص", "الدراز", "باربار",
            "عراد", "الحورة", "كرباباد", "سنابس", "الماحوز", "كرزكان", "عسكر",
        ],
    ),
    (
        "عمان",
        &[
            "مسقط", "صلالة", "نزوى", "صحار", "صور", "البريمي", "عبري", "الرستاق",
            "إبراء", "بهلاء", "إزكي", "بدبد", "المضيبي", "الحمراء", "منح", "ادم",
            "الكامل والوافي", "جعلان بني بو علي", "جعلان بني بو حسن", "مصيرة",
            "الدقم", "هيماء", "ثمريت", "مرباط", "طاقة", "ضلكوت",
        ],
    ),
    (
        "الأردن",
        &[
            "عمان", "إربد", "الزرقاء", "الرصيفة", "القويسمة", "الطفيلة", "الكرك",
            "معان", "عجلون", "جرش", "المفرق", "مادبا", "العقبة", "الرمثا", "السلط",
            "صافوت", "أبو علندا", "البقعة", "الموقر", "ناعور", "سحاب",
            "الجيزة", "دير علا", "الأغوار الشمالية", "الكورة", "بني كنانة",
        ],
    ),
    (
        "لبنان",
        &[
            "بيروت", "طرابلس", "صيدا", "صور", "النبطية", "بعلبك", "جونيه", "زحلة",
            "البترون", "جبيل", "بشري", "الهرمل", "عاليه", "المتن", "كسروان",
            "الشوف", "عكار", "المنية الضنية", "زغرتا", "الكورة", "البقاع الغربي",
            "راشيا", "حاصبيا", "مرجعيون", "بنت جبيل",
        ],
    ),
    (
        "المغرب",
        &[
            "الرباط", "الدار البيضاء", "فاس", "مراكش", "أغادير", "مكناس", "وجدة",
            "القنيطرة", "تطوان", "سلا", "المحمدية", "تمارة", "طنجة", "الصويرة",
            "الجديدة", "بني ملال", "الناظور", "بركان", "تازة", "سطات", "خريبكة",
            "الحسيمة", "ورزازات", "إفران", "الراشيدية", "زاكورة", "العيون",
        ],
    ),
    (
        "تونس",
        &[
            "تونس", "صفاقس", "سوسة", "القيروان", "بنزرت", "قابس", "أريانة", "قفصة",
            "المنستير", "نابل", "تطاوين", "مدنين", "المهدية", "قبلي", "سيدي بوزيد",
            "جندوبة", "الكاف", "توزر", "زغوان", "منوبة", "باجة", "سليانة", "القصرين",
        ],
    ),
    (
        "الجزائر",
        &[
            "الجزائر", "وهران", "قسنطينة", "عنابة", "باتنة", "سطيف", "سيدي بلعباس",
            "بسكرة", "تبسة", "ورقلة", "بجاية", "تلمسان", "الشلف", "جيجل", "مستغانم",
            "المدية", "معسكر", "غرداية", "الطارف", "الوادي", "خنشلة", "سوق أهراس",
            "ميلة", "الأغواط", "غليزان", "النعامة", "البيض", "إليزي", "تندوف",
        ],
    ),
    (
        "ليبيا",
        &[
            "طرابلس", "بنغازي", "مصراتة", "الزاوية", "البيضاء", "سبها", "توكرة",
            "زليتن", "أجدابيا", "درنة", "غريان", "صبراتة", "الكفرة", "مرزق",
            "زوارة", "يفرن", "الأصابعة", "الخمس", "ترهونة", "بني وليد", "سرت",
            "الجبل الأخضر", "الجفارة", "الجبل الغربي", "وادي الحياة",
        ],
    ),
    (
        "العراق",
        &[
            "بغداد", "البصرة", "أربيل", "الموصل", "السليمانية", "النجف", "كربلاء",
            "الناصرية", "العمارة", "الكوت", "الرمادي", "الفلوجة", "كركوك", "دهوك",
            "الحلة", "سامراء", "بعقوبة", "تكريت", "الديوانية", "المثنى", "ميسان",
            "صلاح الدين", "الأنبار", "نينوى", "زاخو", "عقرة", "الحمدانية",
        ],
    ),
    (
        "سوريا",
        &[
            "دمشق", "حلب", "حمص", "حماة", "اللاذقية", "دير الزور", "الرقة", "درعا",
            "السويداء", "القنيطرة", "طرطوس", "إدلب", "الحسكة", "القامشلي", "عفرين",
            "منبج", "جبلة", "بانياس", "صافيتا", "مصياف", "سلمية", "تدمر", "البوكمال",
        ],
    ),
    (
        "اليمن",
        &[
            "صنعاء", "عدن", "تعز", "الحديدة", "إب", "ذمار", "المكلا", "صعدة", "مأرب",
            "عمران", "الضالع", "لحج", "أبين", "شبوة", "الجوف", "حجة", "المحويت",
            "البيضاء", "ريمة", "سقطرى", "حضرموت", "المهرة",
        ],
    ),
    (
        "السودان",
        &[
            "الخرطوم", "أم درمان", "بحري", "مدني", "القضارف", "كسلا", "الأبيض",
            "نيالا", "الفاشر", "زالنجي", "الجنينة", "بورتسودان", "عطبرة", "الدمازين",
            "كوستي", "الرنك", "ملكال", "واو", "جوبا", "رومبيك", "ياي", "توريت",
        ],
    ),
    (
        "فلسطين",
        &[
            "القدس", "غزة", "الخليل", "نابلس", "رام الله", "بيت لحم", "أريحا", "طولكرم",
            "قلقيلية", "سلفيت", "جنين", "طوباس", "رفح", "خان يونس", "دير البلح",
            "الشمال", "الوسطى", "يافا", "حيفا", "عكا", "الناصرة", "صفد", "طبريا",
        ],
    ),
];

/// City to country. A city listed under several countries maps to the first.
static COUNTRY_BY_CITY: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for (country, cities) in CITIES_BY_COUNTRY {
        for city in *cities {
            index.entry(*city).or_insert(*country);
        }
    }
    index
});

/// Country a city belongs to, if the city is in the table
pub fn country_for_city(city: &str) -> Option<&'static str> {
    let city = city.trim();
    if city.is_empty() {
        return None;
    }
    COUNTRY_BY_CITY.get(city).copied()
}

/// Cities of a country in table order. Unknown countries have none.
pub fn cities_for(country: &str) -> &'static [&'static str] {
    CITIES_BY_COUNTRY
        .iter()
        .find(|(name, _)| *name == country)
        .map(|(_, cities)| *cities)
        .unwrap_or(&[])
}

/// All supported countries, sorted
pub fn supported_countries() -> Vec<&'static str> {
    let mut countries: Vec<_> = CITIES_BY_COUNTRY.iter().map(|(name, _)| *name).collect();
    countries.sort_unstable();
    countries
}

/// Case-insensitive substring search over city names.
///
/// A known `country` limits the search to its cities. Otherwise every
/// country is searched and at most [`MAX_UNSCOPED_RESULTS`] cities come back.
pub fn search_cities(query: &str, country: Option<&str>) -> Vec<&'static str> {
    let needle = query.trim().to_lowercase();
    let matches = |city: &&&str| city.to_lowercase().contains(&needle);

    if let Some(cities) = country.map(cities_for).filter(|cities| !cities.is_empty()) {
        return cities.iter().filter(matches).copied().collect();
    }

    CITIES_BY_COUNTRY
        .iter()
        .flat_map(|(_, cities)| cities.iter())
        .filter(matches)
        .take(MAX_UNSCOPED_RESULTS)
        .copied()
        .collect()
}
