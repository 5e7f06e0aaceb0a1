//! Theme catalogs: company brands and topical keyword clusters.
//!
//! Two static company lists (the curated brand themes with search queries and
//! stock tags, and a longer alias-only list) are merged once into a single
//! process-wide catalog. An operator may extend it further with a YAML file
//! of [`CatalogEntry`] records; extension entries follow the same merge rule.
//!
//! # Merge Rule
//!
//! Entries sharing an id are folded together in order. Later entries only
//! *enrich*: a non-empty name or domain replaces the earlier one, lists are
//! appended, and a blank field never erases a value.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::path::Path;

/// Which catalog a theme belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeKind {
    Company,
    Topic,
    /// Synthesized from a capitalized headline token; never persisted.
    Inferred,
}

/// Three-stop gradient used by the vector renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette(pub &'static str, pub &'static str, pub &'static str);

impl Palette {
    /// The same stops rotated one step, for per-item variety.
    pub fn rotated(self) -> Self {
        Palette(self.1, self.2, self.0)
    }
}

/// A company brand or topical cluster the matcher can resolve text to.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub id: String,
    pub kind: ThemeKind,
    pub name: String,
    pub label: String,
    pub subtitle: String,
    /// Matching surface strings, longest first.
    pub aliases: Vec<String>,
    pub search_queries: Vec<String>,
    pub stock_tags: Vec<String>,
    pub logo_domain: Option<String>,
    pub palette: Option<Palette>,
    pub prompt_subject: Option<String>,
}

impl Theme {
    /// Clearbit logo URL for the theme's domain, if it has one.
    pub fn logo_url(&self) -> Option<String> {
        self.logo_domain
            .as_deref()
            .map(|d| format!("https://logo.clearbit.com/{d}?size=512"))
    }

    /// Ephemeral company theme for an uncatalogued name found in a headline.
    pub fn inferred(token: &str) -> Self {
        let id = crate::utils::slugify(token, 24);
        Theme {
            id,
            kind: ThemeKind::Inferred,
            name: token.to_string(),
            label: token.to_uppercase(),
            subtitle: token.to_string(),
            aliases: vec![token.to_string()],
            search_queries: Vec::new(),
            stock_tags: Vec::new(),
            logo_domain: None,
            palette: None,
            prompt_subject: None,
        }
    }
}

/// One company record as written in a catalog source.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub search_queries: Vec<String>,
    #[serde(default)]
    pub stock_tags: Vec<String>,
    #[serde(default)]
    pub prompt_subject: Option<String>,
}

/// Merged, normalized catalogs.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub companies: Vec<Theme>,
    pub topics: Vec<Theme>,
}

static BUILTIN: Lazy<Catalog> = Lazy::new(|| Catalog {
    companies: merge_company_entries(builtin_company_entries()),
    topics: builtin_topics(),
});

impl Catalog {
    /// The process-wide built-in catalog.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// Built-in catalog extended with extra company entries.
    pub fn with_extra(extra: Vec<CatalogEntry>) -> Catalog {
        let mut entries = builtin_company_entries();
        entries.extend(extra);
        Catalog {
            companies: merge_company_entries(entries),
            topics: builtin_topics(),
        }
    }

    /// Load extra company entries from a YAML list.
    pub fn load_extra(path: &Path) -> Result<Vec<CatalogEntry>, Box<dyn Error>> {
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<CatalogEntry> = serde_yaml::from_str(&raw)?;
        Ok(entries)
    }
}

#[cfg(test)]
impl Catalog {
    pub fn company(&self, id: &str) -> Option<&Theme> {
        self.companies.iter().find(|t| t.id == id)
    }

    pub fn topic(&self, id: &str) -> Option<&Theme> {
        self.topics.iter().find(|t| t.id == id)
    }
}

#[derive(Debug, Default)]
struct MergedCompany {
    name: String,
    domain: String,
    aliases: Vec<String>,
    search_queries: Vec<String>,
    stock_tags: Vec<String>,
    prompt_subject: Option<String>,
}

/// Fold entries by id (first-seen order) and normalize aliases.
fn merge_company_entries(entries: Vec<CatalogEntry>) -> Vec<Theme> {
    let mut order: Vec<String> = Vec::new();
    let mut merged: BTreeMap<String, MergedCompany> = BTreeMap::new();

    for entry in entries {
        let id = entry.id.trim().to_lowercase();
        if id.is_empty() {
            continue;
        }
        let slot = merged.entry(id.clone()).or_insert_with(|| {
            order.push(id.clone());
            MergedCompany::default()
        });

        if let Some(name) = entry.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            slot.name = name.to_string();
        }
        let domain = entry
            .domain
            .as_deref()
            .map(|d| d.trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .or_else(|| logo_domain_for(&id).map(str::to_string));
        if let Some(domain) = domain {
            slot.domain = domain;
        }
        if let Some(subject) = entry.prompt_subject.filter(|s| !s.trim().is_empty()) {
            slot.prompt_subject = Some(subject);
        }
        extend_trimmed(&mut slot.aliases, entry.aliases);
        extend_trimmed(&mut slot.search_queries, entry.search_queries);
        extend_trimmed(&mut slot.stock_tags, entry.stock_tags);
    }

    order
        .into_iter()
        .filter_map(|id| merged.remove(&id).map(|m| (id, m)))
        .map(|(id, m)| {
            let name = if m.name.is_empty() { id.clone() } else { m.name };
            let mut aliases = m.aliases;
            aliases.push(name.clone());
            aliases.push(id.clone());
            Theme {
                label: name.to_uppercase(),
                subtitle: name.clone(),
                aliases: normalize_aliases(aliases),
                search_queries: dedup_case_insensitive(m.search_queries),
                stock_tags: m.stock_tags,
                logo_domain: (!m.domain.is_empty()).then_some(m.domain),
                palette: None,
                prompt_subject: m.prompt_subject,
                kind: ThemeKind::Company,
                name,
                id,
            }
        })
        .collect()
}

fn extend_trimmed(target: &mut Vec<String>, values: Vec<String>) {
    target.extend(
        values
            .into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()),
    );
}

fn dedup_case_insensitive(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.to_lowercase()))
        .collect()
}

/// De-duplicate case-insensitively, then order longest first, ties broken
/// lexicographically on the lower-cased alias.
pub fn normalize_aliases(aliases: Vec<String>) -> Vec<String> {
    let mut ordered = dedup_case_insensitive(
        aliases
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect(),
    );
    ordered.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
    });
    ordered
}

fn logo_domain_for(id: &str) -> Option<&'static str> {
    LOGO_DOMAINS.iter().find(|(k, _)| *k == id).map(|(_, d)| *d)
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

struct BrandSeed {
    id: &'static str,
    name: &'static str,
    keywords: &'static [&'static str],
    search_queries: &'static [&'static str],
    stock_tags: &'static [&'static str],
    prompt_subject: &'static str,
}

struct TopicSeed {
    id: &'static str,
    label: &'static str,
    subtitle: &'static str,
    palette: Palette,
    keywords: &'static [&'static str],
    search_queries: &'static [&'static str],
    stock_tags: &'static str,
    prompt_subject: &'static str,
}

fn builtin_company_entries() -> Vec<CatalogEntry> {
    let brands = BRAND_THEMES.iter().map(|b| CatalogEntry {
        id: b.id.to_string(),
        name: Some(b.name.to_string()),
        aliases: strings(b.keywords),
        domain: None,
        search_queries: strings(b.search_queries),
        stock_tags: strings(b.stock_tags),
        prompt_subject: Some(b.prompt_subject.to_string()),
    });
    let extra = EXTRA_COMPANIES.iter().map(|(id, name, aliases)| CatalogEntry {
        id: id.to_string(),
        name: Some(name.to_string()),
        aliases: strings(aliases),
        ..Default::default()
    });
    brands.chain(extra).collect()
}

fn builtin_topics() -> Vec<Theme> {
    TOPIC_THEMES
        .iter()
        .map(|t| Theme {
            id: t.id.to_string(),
            kind: ThemeKind::Topic,
            name: t.subtitle.to_string(),
            label: t.label.to_string(),
            subtitle: t.subtitle.to_string(),
            aliases: normalize_aliases(strings(t.keywords)),
            search_queries: strings(t.search_queries),
            stock_tags: vec![t.stock_tags.to_string()],
            logo_domain: None,
            palette: Some(t.palette),
            prompt_subject: Some(t.prompt_subject.to_string()),
        })
        .collect()
}

/// Palette for the catch-all illustration when no topic matched.
pub const GENERAL_PALETTE: Palette = Palette("#0f172a", "#1e40af", "#38bdf8");

const TOPIC_THEMES: &[TopicSeed] = &[
    TopicSeed {
        id: "ai",
        label: "AI",
        subtitle: "Artificial Intelligence",
        palette: Palette("#0b1020", "#1d4ed8", "#22d3ee"),
        keywords: &["ai", "artificial intelligence", "인공지능", "생성형", "llm", "gpt", "gemini", "agent", "에이전트", "온디바이스 ai"],
        search_queries: &["artificial intelligence workstation", "machine learning engineer desk", "ai chip server room"],
        stock_tags: "technology,computer,data",
        prompt_subject: "an engineer working with AI interface holograms",
    },
    TopicSeed {
        id: "security",
        label: "SECURITY",
        subtitle: "Cyber Security",
        palette: Palette("#111827", "#1f2937", "#0ea5e9"),
        keywords: &["보안", "사이버", "해킹", "랜섬웨어", "피싱", "malware", "hack", "security", "vulnerability", "취약점"],
        search_queries: &["cyber security operations center", "digital lock computer screen", "security analyst monitoring dashboard"],
        stock_tags: "technology,computer,code",
        prompt_subject: "a cybersecurity analyst monitoring threat dashboards",
    },
    TopicSeed {
        id: "semiconductor",
        label: "CHIP",
        subtitle: "Semiconductor",
        palette: Palette("#1f1b4b", "#4338ca", "#a78bfa"),
        keywords: &["반도체", "chip", "칩", "gpu", "npu", "hbm", "파운드리", "foundry", "메모리", "memory"],
        search_queries: &["semiconductor wafer fabrication", "computer chip macro photo", "electronics circuit board closeup"],
        stock_tags: "technology,electronics,circuit",
        prompt_subject: "a close-up semiconductor wafer and chip lab",
    },
    TopicSeed {
        id: "mobile",
        label: "MOBILE",
        subtitle: "Smart Device",
        palette: Palette("#082f49", "#0369a1", "#67e8f9"),
        keywords: &["스마트폰", "휴대폰", "아이폰", "iphone", "android", "안드로이드", "갤럭시", "ios", "웨어러블", "smartphone"],
        search_queries: &["smartphone product photography", "person using mobile app", "phone on desk natural light"],
        stock_tags: "smartphone,technology,device",
        prompt_subject: "a modern smartphone in natural light on a desk",
    },
    TopicSeed {
        id: "cloud",
        label: "CLOUD",
        subtitle: "Cloud Infra",
        palette: Palette("#0f172a", "#334155", "#38bdf8"),
        keywords: &["클라우드", "cloud", "saas", "server", "데이터센터", "data center", "인프라", "infra"],
        search_queries: &["cloud datacenter server racks", "enterprise server room", "network infrastructure operations"],
        stock_tags: "server,technology,datacenter",
        prompt_subject: "server racks in a clean cloud datacenter",
    },
    TopicSeed {
        id: "robotics",
        label: "ROBOTICS",
        subtitle: "Robotics & Automation",
        palette: Palette("#052e2b", "#0f766e", "#2dd4bf"),
        keywords: &["로봇", "robot", "automation", "자동화", "드론", "drone"],
        search_queries: &["industrial robot arm factory", "humanoid robot technology", "automation equipment workplace"],
        stock_tags: "robot,technology,industry",
        prompt_subject: "a humanoid robot in an industrial workspace",
    },
    TopicSeed {
        id: "gaming",
        label: "GAMING",
        subtitle: "Game Industry",
        palette: Palette("#1f1147", "#6d28d9", "#a78bfa"),
        keywords: &["게임", "game", "콘솔", "xbox", "playstation", "닌텐도", "steam"],
        search_queries: &["gaming pc setup desk", "console controller closeup", "esports gaming room"],
        stock_tags: "gaming,computer,technology",
        prompt_subject: "a gaming setup with controller and display",
    },
    TopicSeed {
        id: "space",
        label: "SPACE",
        subtitle: "Space Tech",
        palette: Palette("#0b1020", "#1e3a8a", "#60a5fa"),
        keywords: &["우주", "space", "위성", "satellite", "nasa", "rocket", "로켓"],
        search_queries: &["satellite in space", "rocket launch night", "earth orbit technology"],
        stock_tags: "space,technology,satellite",
        prompt_subject: "a satellite and earth horizon in realistic style",
    },
];

const BRAND_THEMES: &[BrandSeed] = &[
    BrandSeed {
        id: "kakao",
        name: "Kakao",
        keywords: &["카카오", "kakao", "카톡", "kakaotalk"],
        search_queries: &["kakaotalk smartphone app", "korean mobile messenger app", "south korea tech company office"],
        stock_tags: &["korea,office,technology", "startup,office,teamwork", "mobile,app,technology"],
        prompt_subject: "a modern Korean internet company office scene",
    },
    BrandSeed {
        id: "naver",
        name: "Naver",
        keywords: &["네이버", "naver", "라인", "line messenger"],
        search_queries: &["search engine technology office", "korean internet company workspace", "messenger app smartphone usage"],
        stock_tags: &["search,technology,office", "korea,tech,workspace", "mobile,app,productivity"],
        prompt_subject: "a leading search and platform company workspace",
    },
    BrandSeed {
        id: "samsung",
        name: "Samsung",
        keywords: &["삼성", "samsung", "갤럭시"],
        search_queries: &["smartphone product photography", "semiconductor chip laboratory", "consumer electronics showcase"],
        stock_tags: &["smartphone,electronics,technology", "semiconductor,electronics,lab", "display,technology,innovation"],
        prompt_subject: "a global electronics company R&D environment",
    },
    BrandSeed {
        id: "lg",
        name: "LG",
        keywords: &["lg", "엘지", "lg유플러스", "lgu+"],
        search_queries: &["telecommunications network infrastructure", "consumer electronics home devices", "korean technology company office"],
        stock_tags: &["telecom,technology,office", "electronics,home,technology", "network,infrastructure,technology"],
        prompt_subject: "a telecom and electronics company innovation center",
    },
    BrandSeed {
        id: "sk",
        name: "SK",
        keywords: &["skt", "sk텔레콤", "sk telecom", "sk하이닉스", "sk hynix"],
        search_queries: &["telecom network engineers", "semiconductor production facility", "mobile network technology"],
        stock_tags: &["telecom,network,technology", "semiconductor,factory,technology", "data,ai,infrastructure"],
        prompt_subject: "a telecom and semiconductor company operations scene",
    },
    BrandSeed {
        id: "apple",
        name: "Apple",
        keywords: &["애플", "apple", "iphone", "ios", "mac"],
        search_queries: &["iphone smartphone product photo", "minimal laptop workspace setup", "premium consumer electronics"],
        stock_tags: &["smartphone,minimal,technology", "laptop,workspace,technology", "wearable,consumer,electronics"],
        prompt_subject: "a premium consumer tech product launch environment",
    },
    BrandSeed {
        id: "google",
        name: "Google",
        keywords: &["구글", "google", "android", "pixel", "youtube"],
        search_queries: &["android smartphone interface", "search technology data visualization", "cloud ai infrastructure"],
        stock_tags: &["search,data,technology", "android,smartphone,technology", "ai,cloud,technology"],
        prompt_subject: "a global search and AI company product lab",
    },
    BrandSeed {
        id: "microsoft",
        name: "Microsoft",
        keywords: &["마이크로소프트", "microsoft", "windows", "azure", "copilot"],
        search_queries: &["developer laptop coding workspace", "enterprise cloud data center", "business software office environment"],
        stock_tags: &["software,office,technology", "cloud,server,technology", "developer,code,workspace"],
        prompt_subject: "a software and cloud company engineering floor",
    },
    BrandSeed {
        id: "openai",
        name: "OpenAI",
        keywords: &["openai", "챗gpt", "chatgpt", "gpt"],
        search_queries: &["artificial intelligence research lab", "machine learning engineers working", "ai server hardware racks"],
        stock_tags: &["ai,server,technology", "machine-learning,research,technology", "data-center,ai,infrastructure"],
        prompt_subject: "an advanced AI research company environment",
    },
    BrandSeed {
        id: "nvidia",
        name: "NVIDIA",
        keywords: &["엔비디아", "nvidia", "cuda", "rtx", "geforce"],
        search_queries: &["gpu graphics card closeup", "ai accelerator server hardware", "high performance computing datacenter"],
        stock_tags: &["gpu,computer,technology", "datacenter,server,technology", "electronics,circuit,hardware"],
        prompt_subject: "a GPU and AI hardware engineering environment",
    },
    BrandSeed {
        id: "tesla",
        name: "Tesla",
        keywords: &["테슬라", "tesla", "자율주행", "fsd"],
        search_queries: &["electric vehicle technology", "autonomous driving car sensors", "modern EV charging station"],
        stock_tags: &["electric-car,technology,transport", "autonomous,vehicle,innovation", "battery,energy,technology"],
        prompt_subject: "an electric vehicle technology demonstration scene",
    },
    BrandSeed {
        id: "meta",
        name: "Meta",
        keywords: &["메타", "meta", "facebook", "instagram", "threads"],
        search_queries: &["social media smartphone app", "virtual reality headset technology", "internet platform office workspace"],
        stock_tags: &["social-media,smartphone,technology", "vr,headset,technology", "office,software,technology"],
        prompt_subject: "a social platform and mixed-reality product workspace",
    },
    BrandSeed {
        id: "amazon",
        name: "Amazon",
        keywords: &["아마존", "amazon", "aws", "prime", "알렉사", "alexa"],
        search_queries: &["cloud computing datacenter", "warehouse automation robotics", "smart speaker home device"],
        stock_tags: &["cloud,server,technology", "warehouse,robotics,automation", "smart-home,device,technology"],
        prompt_subject: "a cloud and automation technology operations scene",
    },
];

const EXTRA_COMPANIES: &[(&str, &str, &[&str])] = &[
    ("anthropic", "Anthropic", &["anthropic", "claude"]),
    ("xai", "xAI", &["xai", "x.ai", "grok"]),
    ("deepmind", "DeepMind", &["deepmind", "google deepmind"]),
    ("deepseek", "DeepSeek", &["deepseek"]),
    ("intel", "Intel", &["intel", "인텔"]),
    ("amd", "AMD", &["amd", "라이젠", "radeon"]),
    ("qualcomm", "Qualcomm", &["qualcomm", "퀄컴", "snapdragon"]),
    ("tsmc", "TSMC", &["tsmc"]),
    ("arm", "ARM", &["arm", "arm holdings"]),
    ("broadcom", "Broadcom", &["broadcom"]),
    ("oracle", "Oracle", &["oracle", "오라클"]),
    ("ibm", "IBM", &["ibm"]),
    ("adobe", "Adobe", &["adobe", "어도비"]),
    ("salesforce", "Salesforce", &["salesforce", "세일즈포스"]),
    ("sap", "SAP", &["sap"]),
    ("palantir", "Palantir", &["palantir"]),
    ("uber", "Uber", &["uber"]),
    ("airbnb", "Airbnb", &["airbnb"]),
    ("netflix", "Netflix", &["netflix", "넷플릭스"]),
    ("sony", "Sony", &["sony", "소니"]),
    ("nintendo", "Nintendo", &["nintendo", "닌텐도"]),
    ("softbank", "SoftBank", &["softbank", "소프트뱅크"]),
    ("huawei", "Huawei", &["huawei", "화웨이"]),
    ("xiaomi", "Xiaomi", &["xiaomi", "샤오미"]),
    ("lenovo", "Lenovo", &["lenovo", "레노버"]),
    ("baidu", "Baidu", &["baidu", "바이두"]),
    ("tencent", "Tencent", &["tencent", "텐센트"]),
    ("alibaba", "Alibaba", &["alibaba", "알리바바"]),
    ("bytedance", "ByteDance", &["bytedance", "틱톡", "tiktok"]),
    ("hyundai", "Hyundai", &["현대", "hyundai", "현대차"]),
    ("kia", "Kia", &["기아", "kia"]),
    ("posco", "POSCO", &["포스코", "posco"]),
    ("hanwha", "Hanwha", &["한화", "hanwha"]),
    ("lotte", "Lotte", &["롯데", "lotte"]),
    ("cj", "CJ", &["cj", "씨제이"]),
    ("kt", "KT", &["kt", "케이티"]),
    ("coupang", "Coupang", &["쿠팡", "coupang"]),
    ("nhn", "NHN", &["nhn"]),
    ("nexon", "Nexon", &["넥슨", "nexon"]),
    ("krafton", "Krafton", &["크래프톤", "krafton"]),
    ("ncsoft", "NCSoft", &["엔씨소프트", "ncsoft"]),
    ("pearlabyss", "Pearl Abyss", &["펄어비스", "pearl abyss", "pearlabyss"]),
    ("asml", "ASML", &["asml"]),
    ("siemens", "Siemens", &["siemens"]),
    ("bosch", "Bosch", &["bosch"]),
];

const LOGO_DOMAINS: &[(&str, &str)] = &[
    ("kakao", "kakao.com"),
    ("naver", "navercorp.com"),
    ("samsung", "samsung.com"),
    ("lg", "lg.com"),
    ("sk", "sktelecom.com"),
    ("apple", "apple.com"),
    ("google", "google.com"),
    ("microsoft", "microsoft.com"),
    ("openai", "openai.com"),
    ("nvidia", "nvidia.com"),
    ("tesla", "tesla.com"),
    ("meta", "meta.com"),
    ("amazon", "amazon.com"),
    ("anthropic", "anthropic.com"),
    ("xai", "x.ai"),
    ("deepmind", "deepmind.google"),
    ("deepseek", "deepseek.com"),
    ("intel", "intel.com"),
    ("amd", "amd.com"),
    ("qualcomm", "qualcomm.com"),
    ("tsmc", "tsmc.com"),
    ("arm", "arm.com"),
    ("broadcom", "broadcom.com"),
    ("oracle", "oracle.com"),
    ("ibm", "ibm.com"),
    ("adobe", "adobe.com"),
    ("salesforce", "salesforce.com"),
    ("sap", "sap.com"),
    ("palantir", "palantir.com"),
    ("uber", "uber.com"),
    ("airbnb", "airbnb.com"),
    ("netflix", "netflix.com"),
    ("sony", "sony.com"),
    ("nintendo", "nintendo.com"),
    ("softbank", "softbank.jp"),
    ("huawei", "huawei.com"),
    ("xiaomi", "xiaomi.com"),
    ("lenovo", "lenovo.com"),
    ("baidu", "baidu.com"),
    ("tencent", "tencent.com"),
    ("alibaba", "alibaba.com"),
    ("bytedance", "bytedance.com"),
    ("hyundai", "hyundai.com"),
    ("kia", "kia.com"),
    ("posco", "posco.com"),
    ("hanwha", "hanwha.com"),
    ("lotte", "lotte.co.kr"),
    ("cj", "cj.net"),
    ("kt", "kt.com"),
    ("coupang", "coupang.com"),
    ("nhn", "nhn.com"),
    ("nexon", "nexon.com"),
    ("krafton", "krafton.com"),
    ("ncsoft", "ncsoft.com"),
    ("pearlabyss", "pearlabyss.com"),
    ("asml", "asml.com"),
    ("siemens", "siemens.com"),
    ("bosch", "bosch.com"),
];
